//! Service-wide error types.
//!
//! One tagged enum threads through the dispatcher instead of a hierarchy of
//! thrown exceptions: `Configuration` fails fast and is never retried,
//! `Moderation` and `Parse` are terminal per call, and `Port` carries an
//! external collaborator's failure through unmodified.

use thiserror::Error;

use crate::moderation::Moderation;

/// Failure reported by an external port (model, moderation, memory, loader).
///
/// The core neither masks nor wraps these — whatever message the port
/// produced is surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PortError(pub String);

impl PortError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing/empty template or resource, unbound placeholder, bad assembly.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The moderation gate flagged the outbound text. Carries the full
    /// [`Moderation`] evidence; the model's answer, if any, is discarded.
    #[error("text \"{}\" violates content policy", .0.flagged_text.as_deref().unwrap_or(""))]
    Moderation(Moderation),

    /// Response text does not conform to the derived schema. No silent
    /// coercion is attempted.
    #[error("parse error: {0}")]
    Parse(String),

    /// External port failure, passed through unmodified.
    #[error(transparent)]
    Port(#[from] PortError),
}

impl ServiceError {
    /// The moderation evidence, when this is a [`ServiceError::Moderation`].
    pub fn moderation(&self) -> Option<&Moderation> {
        match self {
            ServiceError::Moderation(m) => Some(m),
            _ => None,
        }
    }
}
