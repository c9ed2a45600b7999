//! Round-trip properties: a reply that follows the derived instruction
//! parses back to the value it encodes, for every descriptor family.

use sibyl::{parse, EnumType, RecordType, ResponseValue, TypeDescriptor};

#[test]
fn derivation_is_repeatable() {
    let families = [
        TypeDescriptor::int(),
        TypeDescriptor::boolean(),
        TypeDescriptor::date(),
        EnumType::new("Sentiment").variant("POSITIVE").variant("NEGATIVE").into(),
        TypeDescriptor::list(EnumType::new("Ingredient").variant("SALT")),
        TypeDescriptor::map(TypeDescriptor::text(), TypeDescriptor::int()),
        RecordType::new("Booking").field("userId", TypeDescriptor::text()).into(),
    ];
    for ty in families {
        assert_eq!(ty.format_instruction(), ty.format_instruction());
    }
}

#[test]
fn primitive_round_trip() {
    assert_eq!(
        parse::parse("42", &TypeDescriptor::int()).unwrap(),
        ResponseValue::Int(42)
    );
    assert_eq!(
        parse::parse("false", &TypeDescriptor::boolean()).unwrap(),
        ResponseValue::Bool(false)
    );
    assert_eq!(
        parse::parse("2.5", &TypeDescriptor::float()).unwrap(),
        ResponseValue::Float(2.5)
    );
}

#[test]
fn enum_round_trip() {
    let ty: TypeDescriptor = EnumType::new("Sentiment")
        .variant("POSITIVE")
        .variant("NEUTRAL")
        .variant("NEGATIVE")
        .into();
    // every listed constant is a valid reply
    for name in ["POSITIVE", "NEUTRAL", "NEGATIVE"] {
        assert_eq!(
            parse::parse(name, &ty).unwrap(),
            ResponseValue::Enum(name.into())
        );
    }
}

#[test]
fn enum_collection_round_trip() {
    let ty = TypeDescriptor::list(
        EnumType::new("Ingredient")
            .variant("SALT")
            .variant("PEPPER")
            .variant("VINEGAR")
            .variant("OIL"),
    );
    let reply = "SALT\nPEPPER\nOIL";
    assert_eq!(
        parse::parse(reply, &ty).unwrap(),
        ResponseValue::List(vec![
            ResponseValue::Enum("SALT".into()),
            ResponseValue::Enum("PEPPER".into()),
            ResponseValue::Enum("OIL".into()),
        ])
    );
}

#[test]
fn map_round_trip() {
    let ty = TypeDescriptor::map(TypeDescriptor::text(), TypeDescriptor::int());
    let reply = "{\"Klaus\": 42, \"Francine\": 47}";
    assert_eq!(
        parse::parse(reply, &ty).unwrap(),
        ResponseValue::Map(vec![
            ("Klaus".into(), ResponseValue::Int(42)),
            ("Francine".into(), ResponseValue::Int(47)),
        ])
    );
}

#[test]
fn record_round_trip() {
    let ty: TypeDescriptor = RecordType::new("Booking")
        .field("userId", TypeDescriptor::text())
        .field("bookingId", TypeDescriptor::text())
        .into();
    let reply = "{\"userId\": \"klaus-1\", \"bookingId\": \"b-42\"}";
    let parsed = parse::parse(reply, &ty).unwrap();
    assert_eq!(
        parsed,
        ResponseValue::Record(vec![
            ("userId".into(), ResponseValue::Text("klaus-1".into())),
            ("bookingId".into(), ResponseValue::Text("b-42".into())),
        ])
    );
}
