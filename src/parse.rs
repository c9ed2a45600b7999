//! Response parsing — raw model text in, a typed value out.
//!
//! Inverts the format instructions derived in [`crate::schema`]: for every
//! [`TypeDescriptor`] there is exactly one way a conforming reply decodes.
//! Non-conforming text is a `ParseError` — no silent coercion, no
//! best-effort guessing.
//!
//! Parsed values are dynamic [`ResponseValue`]s mirroring the descriptor
//! variants; accessors extract the concrete Rust types.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ServiceError;
use crate::schema::{EnumType, PrimitiveKind, RecordType, TypeDescriptor};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// ── ResponseValue ─────────────────────────────────────────────────────────────

/// A parsed model reply.
///
/// `Null` marks a record field absent from the payload — the dynamic
/// equivalent of an unanswered optional field; it never appears at the top
/// level of a successful parse.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseValue {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    /// A matched enum constant name.
    Enum(String),
    List(Vec<ResponseValue>),
    /// Key/value pairs in first-encountered order.
    Map(Vec<(String, ResponseValue)>),
    /// Record fields in declared order.
    Record(Vec<(String, ResponseValue)>),
}

impl ResponseValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseValue::Text(s) | ResponseValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ResponseValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ResponseValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ResponseValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            ResponseValue::Date(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            ResponseValue::Time(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            ResponseValue::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ResponseValue]> {
        match self {
            ResponseValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ResponseValue::Null)
    }

    /// Look up a record field or map entry by key.
    pub fn get(&self, key: &str) -> Option<&ResponseValue> {
        match self {
            ResponseValue::Record(entries) | ResponseValue::Map(entries) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `raw` model output against `descriptor`.
pub fn parse(raw: &str, descriptor: &TypeDescriptor) -> Result<ResponseValue, ServiceError> {
    match descriptor {
        TypeDescriptor::Primitive(kind) => parse_primitive(raw, *kind),
        TypeDescriptor::Enum(e) => parse_enum(raw.trim(), e),
        TypeDescriptor::List(inner) => {
            // One item per line; blank lines are dropped, duplicates and
            // first-seen order are kept.
            let items = raw
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| parse(line, inner))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ResponseValue::List(items))
        }
        TypeDescriptor::Map(_, value_ty) => {
            let object = decode_json_object(raw)?;
            let entries = object
                .into_iter()
                .map(|(k, v)| Ok((k, from_json(v, value_ty)?)))
                .collect::<Result<Vec<_>, ServiceError>>()?;
            Ok(ResponseValue::Map(entries))
        }
        TypeDescriptor::Record(record) => {
            let object = decode_json_object(raw)?;
            parse_record(object, record)
        }
    }
}

fn parse_primitive(raw: &str, kind: PrimitiveKind) -> Result<ResponseValue, ServiceError> {
    let trimmed = raw.trim();
    match kind {
        PrimitiveKind::Text => Ok(ResponseValue::Text(raw.to_string())),
        PrimitiveKind::Int => trimmed
            .parse::<i64>()
            .map(ResponseValue::Int)
            .map_err(|_| parse_error(trimmed, "integer")),
        PrimitiveKind::Float => trimmed
            .parse::<f64>()
            .map(ResponseValue::Float)
            .map_err(|_| parse_error(trimmed, "floating point number")),
        PrimitiveKind::Bool => trimmed
            .parse::<bool>()
            .map(ResponseValue::Bool)
            .map_err(|_| parse_error(trimmed, "boolean")),
        PrimitiveKind::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .map(ResponseValue::Date)
            .map_err(|_| parse_error(trimmed, "date (yyyy-MM-dd)")),
        PrimitiveKind::Time => NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
            .map(ResponseValue::Time)
            .map_err(|_| parse_error(trimmed, "time (HH:mm:ss)")),
        PrimitiveKind::DateTime => NaiveDateTime::parse_from_str(trimmed, DATE_TIME_FORMAT)
            .map(ResponseValue::DateTime)
            .map_err(|_| parse_error(trimmed, "date-time (yyyy-MM-ddTHH:mm:ss)")),
    }
}

/// Exact, case-sensitive match against the declared constants.
fn parse_enum(raw: &str, e: &EnumType) -> Result<ResponseValue, ServiceError> {
    if e.variants.iter().any(|v| v.name == raw) {
        Ok(ResponseValue::Enum(raw.to_string()))
    } else {
        Err(ServiceError::Parse(format!(
            "\"{raw}\" is not a constant of enum {}",
            e.name
        )))
    }
}

fn parse_record(
    object: serde_json::Map<String, serde_json::Value>,
    record: &RecordType,
) -> Result<ResponseValue, ServiceError> {
    // Declared fields only; unrecognized payload keys are ignored, absent
    // fields become Null rather than failing the whole parse.
    let mut entries = Vec::with_capacity(record.fields.len());
    for field in &record.fields {
        let value = match object.get(&field.name) {
            Some(v) => from_json(v.clone(), &field.ty)?,
            None => ResponseValue::Null,
        };
        entries.push((field.name.clone(), value));
    }
    Ok(ResponseValue::Record(entries))
}

fn decode_json_object(
    raw: &str,
) -> Result<serde_json::Map<String, serde_json::Value>, ServiceError> {
    match serde_json::from_str::<serde_json::Value>(raw.trim()) {
        Ok(serde_json::Value::Object(object)) => Ok(object),
        Ok(other) => Err(ServiceError::Parse(format!(
            "expected a JSON object, got: {other}"
        ))),
        Err(e) => Err(ServiceError::Parse(format!("malformed JSON: {e}"))),
    }
}

/// Convert an already-decoded JSON value per the declared descriptor.
///
/// Scalars inside JSON may arrive as their native JSON type or as a string
/// holding the canonical textual form; both decode, anything else fails.
fn from_json(
    value: serde_json::Value,
    descriptor: &TypeDescriptor,
) -> Result<ResponseValue, ServiceError> {
    use serde_json::Value as Json;
    match (descriptor, value) {
        (_, Json::Null) => Ok(ResponseValue::Null),
        (TypeDescriptor::Primitive(PrimitiveKind::Text), Json::String(s)) => {
            Ok(ResponseValue::Text(s))
        }
        (TypeDescriptor::Primitive(PrimitiveKind::Int), Json::Number(n)) => n
            .as_i64()
            .map(ResponseValue::Int)
            .ok_or_else(|| parse_error(&n.to_string(), "integer")),
        (TypeDescriptor::Primitive(PrimitiveKind::Float), Json::Number(n)) => n
            .as_f64()
            .map(ResponseValue::Float)
            .ok_or_else(|| parse_error(&n.to_string(), "floating point number")),
        (TypeDescriptor::Primitive(PrimitiveKind::Bool), Json::Bool(b)) => {
            Ok(ResponseValue::Bool(b))
        }
        (TypeDescriptor::Primitive(_) | TypeDescriptor::Enum(_), Json::String(s)) => {
            parse(&s, descriptor)
        }
        (TypeDescriptor::List(inner), Json::Array(items)) => {
            let parsed = items
                .into_iter()
                .map(|item| from_json(item, inner))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ResponseValue::List(parsed))
        }
        (TypeDescriptor::Map(_, value_ty), Json::Object(object)) => {
            let entries = object
                .into_iter()
                .map(|(k, v)| Ok((k, from_json(v, value_ty)?)))
                .collect::<Result<Vec<_>, ServiceError>>()?;
            Ok(ResponseValue::Map(entries))
        }
        (TypeDescriptor::Record(record), Json::Object(object)) => parse_record(object, record),
        (_, other) => Err(ServiceError::Parse(format!(
            "JSON value {other} does not match the declared shape"
        ))),
    }
}

fn parse_error(text: &str, expected: &str) -> ServiceError {
    ServiceError::Parse(format!("cannot parse \"{text}\" as {expected}"))
}
