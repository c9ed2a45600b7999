//! Template resolution — literal text plus bound arguments in, message text out.
//!
//! Substitution is flat and literal: each `{{identifier}}` is replaced by the
//! textual rendering of its bound value. The single sentinel placeholder
//! `{{it}}` binds the one unnamed argument of a call. No conditionals, no
//! loops, no escaping — a template is prompt text, not a program.
//!
//! Resource-backed templates are loaded once at service build time; by the
//! time [`resolve`] runs, a template is always literal text.

use crate::error::ServiceError;

/// Name of the sentinel placeholder bound to a single unnamed argument.
pub(crate) const SENTINEL: &str = "it";

// ── TemplateSpec ──────────────────────────────────────────────────────────────

/// A template source: literal text, or a path resolved through the
/// resource-load port at service build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSpec {
    Inline(String),
    Resource(String),
}

impl TemplateSpec {
    pub fn inline(text: impl Into<String>) -> Self {
        TemplateSpec::Inline(text.into())
    }

    pub fn resource(path: impl Into<String>) -> Self {
        TemplateSpec::Resource(path.into())
    }
}

// ── TemplateValue ─────────────────────────────────────────────────────────────

/// A value bound to a placeholder.
///
/// Scalars render as their display text; lists render `[a, b, c]` —
/// comma-space-joined and bracketed.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    Text(String),
    List(Vec<String>),
}

impl TemplateValue {
    pub(crate) fn render(&self) -> String {
        match self {
            TemplateValue::Text(s) => s.clone(),
            TemplateValue::List(items) => format!("[{}]", items.join(", ")),
        }
    }
}

impl From<&str> for TemplateValue {
    fn from(v: &str) -> Self { TemplateValue::Text(v.to_string()) }
}
impl From<String> for TemplateValue {
    fn from(v: String) -> Self { TemplateValue::Text(v) }
}
impl From<i64> for TemplateValue {
    fn from(v: i64) -> Self { TemplateValue::Text(v.to_string()) }
}
impl From<i32> for TemplateValue {
    fn from(v: i32) -> Self { TemplateValue::Text(v.to_string()) }
}
impl From<u64> for TemplateValue {
    fn from(v: u64) -> Self { TemplateValue::Text(v.to_string()) }
}
impl From<f64> for TemplateValue {
    fn from(v: f64) -> Self { TemplateValue::Text(v.to_string()) }
}
impl From<bool> for TemplateValue {
    fn from(v: bool) -> Self { TemplateValue::Text(v.to_string()) }
}
impl From<Vec<String>> for TemplateValue {
    fn from(v: Vec<String>) -> Self { TemplateValue::List(v) }
}
impl From<Vec<&str>> for TemplateValue {
    fn from(v: Vec<&str>) -> Self {
        TemplateValue::List(v.into_iter().map(str::to_string).collect())
    }
}
impl From<&[&str]> for TemplateValue {
    fn from(v: &[&str]) -> Self {
        TemplateValue::List(v.iter().map(|s| s.to_string()).collect())
    }
}

// ── StructuredPrompt ──────────────────────────────────────────────────────────

/// A prompt object carrying its own template text plus named field values.
///
/// Resolves through the same substitution mechanism as any other template;
/// the resolved text becomes the user message of the call.
#[derive(Debug, Clone)]
pub struct StructuredPrompt {
    pub(crate) template: String,
    pub(crate) values: Vec<(String, TemplateValue)>,
}

impl StructuredPrompt {
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into(), values: Vec::new() }
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<TemplateValue>) -> Self {
        self.values.push((name.into(), value.into()));
        self
    }
}

// ── Args ──────────────────────────────────────────────────────────────────────

/// Arguments bound to one invocation.
///
/// At most one unnamed value (the sentinel binding), any number of named
/// values, and optionally a [`StructuredPrompt`] whose declared fields join
/// the named bindings and whose template text becomes the user message.
#[derive(Debug, Clone, Default)]
pub struct Args {
    named: Vec<(String, TemplateValue)>,
    it: Option<TemplateValue>,
    prompt: Option<StructuredPrompt>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the single unnamed argument (the `{{it}}` sentinel).
    pub fn it(value: impl Into<TemplateValue>) -> Self {
        Self { it: Some(value.into()), ..Self::default() }
    }

    /// Use a structured prompt as the user message source.
    pub fn prompt(prompt: StructuredPrompt) -> Self {
        Self { prompt: Some(prompt), ..Self::default() }
    }

    /// Bind a named argument.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<TemplateValue>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    pub(crate) fn structured(&self) -> Option<&StructuredPrompt> {
        self.prompt.as_ref()
    }

    /// Look up a binding: the sentinel first, then named arguments in
    /// binding order, then structured-prompt fields.
    pub(crate) fn lookup(&self, name: &str) -> Option<&TemplateValue> {
        if name == SENTINEL {
            if let Some(v) = &self.it {
                return Some(v);
            }
        }
        if let Some((_, v)) = self.named.iter().find(|(n, _)| n == name) {
            return Some(v);
        }
        self.prompt
            .as_ref()
            .and_then(|p| p.values.iter().find(|(n, _)| n == name))
            .map(|(_, v)| v)
    }
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// Substitute every `{{identifier}}` in `template` with its bound value.
///
/// Fails with a `ConfigurationError` when a placeholder has no binding or
/// when the resolved text is blank after trimming. Text between placeholders
/// is copied verbatim; a `{{…}}` whose inner token is not an identifier is
/// left untouched.
pub fn resolve(template: &str, args: &Args) -> Result<String, ServiceError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) if is_identifier(&after[..close]) => {
                let name = &after[..close];
                let value = args.lookup(name).ok_or_else(|| {
                    ServiceError::Configuration(format!(
                        "no value bound for placeholder '{{{{{name}}}}}'"
                    ))
                })?;
                out.push_str(&value.render());
                rest = &after[close + 2..];
            }
            _ => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);

    if out.trim().is_empty() {
        return Err(ServiceError::Configuration(
            "resolved template text cannot be blank".into(),
        ));
    }
    Ok(out)
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
