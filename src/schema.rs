//! Return-shape descriptors and format-instruction derivation.
//!
//! [`TypeDescriptor`] is a closed recursive variant describing the value a
//! method call must produce. A descriptor is built once per method signature
//! through the constructors below and is immutable for the service's
//! lifetime.
//!
//! [`TypeDescriptor::format_instruction`] derives the trailing instruction
//! text appended to the user message. Derivation is pure and deterministic:
//! the same descriptor always yields byte-identical text. Downstream parsing
//! and established model-prompting conventions depend on the exact wording —
//! do not reword these strings.

const FORMAT_PREFIX: &str = "You must answer strictly in the following format: ";
const ENUM_SINGLE_PREFIX: &str = "You must answer strictly with one of these enums:\n";
const ENUM_MULTI_PREFIX: &str =
    "You must answer strictly with zero or more of these enums on a separate line:\n";
const ITEM_PER_LINE: &str = "You must put every item on a separate line.";
const JSON_PREFIX: &str = "You must answer strictly in the following JSON format: ";

// ── Descriptor types ──────────────────────────────────────────────────────────

/// Scalar target shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// Free-form text: no instruction is appended, the raw reply is the value.
    Text,
    Int,
    Float,
    Bool,
    Date,
    Time,
    DateTime,
}

/// One constant of an [`EnumType`], optionally described for the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: String,
    pub description: Option<String>,
}

/// A named enumeration with an ordered list of constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub variants: Vec<EnumVariant>,
}

impl EnumType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), variants: Vec::new() }
    }

    pub fn variant(mut self, name: impl Into<String>) -> Self {
        self.variants.push(EnumVariant { name: name.into(), description: None });
        self
    }

    pub fn described_variant(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.variants.push(EnumVariant {
            name: name.into(),
            description: Some(description.into()),
        });
        self
    }

    /// One line per constant: `NAME` or `NAME - description`.
    fn listing(&self) -> String {
        self.variants
            .iter()
            .map(|v| match &v.description {
                Some(d) => format!("{} - {}", v.name, d),
                None => v.name.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One field of a [`RecordType`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeDescriptor,
    pub description: Option<String>,
}

/// A named record with an ordered field list.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    pub name: String,
    pub fields: Vec<Field>,
}

impl RecordType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    pub fn field(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.fields.push(Field { name: name.into(), ty, description: None });
        self
    }

    pub fn described_field(
        mut self,
        name: impl Into<String>,
        ty: TypeDescriptor,
        description: impl Into<String>,
    ) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty,
            description: Some(description.into()),
        });
        self
    }

    /// `{` … `}` JSON skeleton, one line per field.
    fn json_structure(&self) -> String {
        let lines = self
            .fields
            .iter()
            .map(|f| {
                let annotation = match &f.description {
                    Some(d) => format!("{d}; type: {}", f.ty.json_type_expr()),
                    None => format!("type: {}", f.ty.json_type_expr()),
                };
                format!("\"{}\": ({annotation})", f.name)
            })
            .collect::<Vec<_>>()
            .join(",\n");
        format!("{{\n{lines}\n}}")
    }
}

/// Closed recursive description of a method's return shape.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    Enum(EnumType),
    List(Box<TypeDescriptor>),
    Map(Box<TypeDescriptor>, Box<TypeDescriptor>),
    Record(RecordType),
}

impl From<EnumType> for TypeDescriptor {
    fn from(e: EnumType) -> Self { TypeDescriptor::Enum(e) }
}
impl From<RecordType> for TypeDescriptor {
    fn from(r: RecordType) -> Self { TypeDescriptor::Record(r) }
}

impl TypeDescriptor {
    pub fn text() -> Self { TypeDescriptor::Primitive(PrimitiveKind::Text) }
    pub fn int() -> Self { TypeDescriptor::Primitive(PrimitiveKind::Int) }
    pub fn float() -> Self { TypeDescriptor::Primitive(PrimitiveKind::Float) }
    pub fn boolean() -> Self { TypeDescriptor::Primitive(PrimitiveKind::Bool) }
    pub fn date() -> Self { TypeDescriptor::Primitive(PrimitiveKind::Date) }
    pub fn time() -> Self { TypeDescriptor::Primitive(PrimitiveKind::Time) }
    pub fn date_time() -> Self { TypeDescriptor::Primitive(PrimitiveKind::DateTime) }

    pub fn list(inner: impl Into<TypeDescriptor>) -> Self {
        TypeDescriptor::List(Box::new(inner.into()))
    }

    pub fn map(key: impl Into<TypeDescriptor>, value: impl Into<TypeDescriptor>) -> Self {
        TypeDescriptor::Map(Box::new(key.into()), Box::new(value.into()))
    }

    /// Derive the trailing format instruction for this shape.
    ///
    /// `None` means nothing is appended: free-form text, and maps (the
    /// caller's own prompt describes the JSON map; the parser still decodes
    /// a flat JSON object).
    pub fn format_instruction(&self) -> Option<String> {
        match self {
            TypeDescriptor::Primitive(PrimitiveKind::Text) => None,
            TypeDescriptor::Primitive(kind) => {
                Some(format!("{FORMAT_PREFIX}{}", kind.format_token()))
            }
            TypeDescriptor::Enum(e) => Some(format!("{ENUM_SINGLE_PREFIX}{}", e.listing())),
            TypeDescriptor::List(inner) => match inner.as_ref() {
                TypeDescriptor::Enum(e) => {
                    Some(format!("{ENUM_MULTI_PREFIX}{}", e.listing()))
                }
                other => Some(match other.format_instruction() {
                    Some(base) => format!("{base}\n{ITEM_PER_LINE}"),
                    None => ITEM_PER_LINE.to_string(),
                }),
            },
            TypeDescriptor::Map(_, _) => None,
            TypeDescriptor::Record(r) => Some(format!("{JSON_PREFIX}{}", r.json_structure())),
        }
    }

    /// Type expression used inside a record's JSON skeleton.
    fn json_type_expr(&self) -> String {
        match self {
            TypeDescriptor::Primitive(kind) => kind.json_token().to_string(),
            TypeDescriptor::Enum(e) => e.name.clone(),
            TypeDescriptor::List(inner) => format!("array of {}", inner.json_type_expr()),
            TypeDescriptor::Map(key, value) => {
                format!("map of {} to {}", key.json_type_expr(), value.json_type_expr())
            }
            TypeDescriptor::Record(r) => format!("{}: {}", r.name, r.json_structure()),
        }
    }
}

impl PrimitiveKind {
    /// Token after the `You must answer strictly in the following format:`
    /// prefix. `Text` never reaches here — it derives no instruction.
    fn format_token(&self) -> &'static str {
        match self {
            PrimitiveKind::Text => "string",
            PrimitiveKind::Int => "integer number",
            PrimitiveKind::Float => "floating point number",
            PrimitiveKind::Bool => "one of [true, false]",
            PrimitiveKind::Date => "yyyy-MM-dd",
            PrimitiveKind::Time => "HH:mm:ss",
            PrimitiveKind::DateTime => "yyyy-MM-ddTHH:mm:ss",
        }
    }

    fn json_token(&self) -> &'static str {
        match self {
            PrimitiveKind::Text => "string",
            PrimitiveKind::Int => "integer",
            PrimitiveKind::Float => "floating point number",
            PrimitiveKind::Bool => "boolean",
            PrimitiveKind::Date => "date string (2023-12-31)",
            PrimitiveKind::Time => "time string (23:59:59)",
            PrimitiveKind::DateTime => "date-time string (2023-12-31T23:59:59)",
        }
    }
}
