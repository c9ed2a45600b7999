//! Model port — the external chat-completion boundary.
//!
//! [`ChatModel`] is the trait a backend implements; the core calls `chat`
//! once per invocation and treats everything else as descriptive metadata.
//! Bundled backends live in `providers/`; add a new module + enum variant
//! there for each additional one.

pub mod providers;

use crate::error::PortError;
use crate::request::{ChatRequest, RequestParameters};

// ── Response values ───────────────────────────────────────────────────────────

/// Token accounting reported by the model.
///
/// The total is always the sum of the parts — it is computed, never stored,
/// so the invariant cannot drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Other(String),
}

/// One model reply: raw text plus accounting and any source references
/// contributed by retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub content: String,
    pub token_usage: Option<TokenUsage>,
    pub finish_reason: Option<FinishReason>,
    pub sources: Vec<String>,
}

impl ChatResponse {
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            token_usage: None,
            finish_reason: None,
            sources: Vec::new(),
        }
    }
}

// ── Metadata ──────────────────────────────────────────────────────────────────

/// Optional behaviors a backend advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    JsonResponseFormat,
}

/// Descriptive backend metadata, queried at service assembly only — never
/// part of templating or parsing control flow.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMetadata {
    pub provider: String,
    pub capabilities: Vec<Capability>,
    /// Seed parameters for every request built against this backend.
    pub default_parameters: RequestParameters,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            provider: "unspecified".into(),
            capabilities: Vec::new(),
            default_parameters: RequestParameters::default(),
        }
    }
}

// ── Port ──────────────────────────────────────────────────────────────────────

/// External chat-completion backend.
///
/// The port owns its own transport policy — retries, timeouts,
/// cancellation. The core issues one `chat` call per invocation and
/// propagates whatever error the port produces.
pub trait ChatModel: Send + Sync {
    fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, PortError>;

    fn metadata(&self) -> ModelMetadata {
        ModelMetadata::default()
    }
}
