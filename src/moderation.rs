//! Moderation gate — classifier outcome on outbound text.
//!
//! The gate is stateless and makes a single external call per guarded
//! invocation. It only reports; the dispatcher decides how to react to a
//! flagged outcome.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::PortError;
use crate::message::Message;

// ── Outcome ───────────────────────────────────────────────────────────────────

/// Classifier verdict on a batch of outbound messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moderation {
    pub flagged: bool,
    /// The offending text, when `flagged` is true.
    pub flagged_text: Option<String>,
}

impl Moderation {
    pub fn flagged(text: impl Into<String>) -> Self {
        Self { flagged: true, flagged_text: Some(text.into()) }
    }

    pub fn not_flagged() -> Self {
        Self { flagged: false, flagged_text: None }
    }
}

// ── Port ──────────────────────────────────────────────────────────────────────

/// External moderation classifier.
pub trait ModerationModel: Send + Sync {
    fn moderate(&self, messages: &[Message]) -> Result<Moderation, PortError>;
}

// ── OpenAI-compatible adapter ─────────────────────────────────────────────────

/// Adapter for any HTTP endpoint implementing `/v1/moderations`.
///
/// One POST per call; the first input whose result is flagged becomes the
/// `flagged_text` evidence. Wire types are private to this module.
#[derive(Debug, Clone)]
pub struct OpenAiModerationModel {
    client: Client,
    api_base_url: String,
    api_key: Option<String>,
}

impl OpenAiModerationModel {
    /// Build an adapter from config values and an optional API key.
    ///
    /// `api_key` is `None` for keyless local classifiers. When present it is
    /// sent as `Authorization: Bearer <key>` on every request.
    pub fn new(
        api_base_url: String,
        timeout_seconds: u64,
        api_key: Option<String>,
    ) -> Result<Self, PortError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| PortError::new(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, api_base_url, api_key })
    }
}

impl ModerationModel for OpenAiModerationModel {
    fn moderate(&self, messages: &[Message]) -> Result<Moderation, PortError> {
        let inputs: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        let payload = ModerationRequest { input: &inputs };

        debug!(inputs = inputs.len(), "sending moderation request");

        let mut req = self.client.post(&self.api_base_url).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().map_err(|e| {
            error!(url = %self.api_base_url, error = %e, "moderation HTTP request failed");
            PortError::new(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_else(|_| "<failed to read error body>".into());
            error!(%status, "moderation request returned HTTP error");
            return Err(PortError::new(format!("HTTP {status}: {body}")));
        }

        let parsed = response
            .json::<ModerationResponse>()
            .map_err(|e| PortError::new(format!("failed to parse moderation body: {e}")))?;

        for (result, input) in parsed.results.iter().zip(&inputs) {
            if result.flagged {
                return Ok(Moderation::flagged(*input));
            }
        }
        Ok(Moderation::not_flagged())
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ModerationRequest<'a> {
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationResult>,
}

#[derive(Debug, Deserialize)]
struct ModerationResult {
    flagged: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flagged_constructor_carries_text() {
        let m = Moderation::flagged("bad words");
        assert!(m.flagged);
        assert_eq!(m.flagged_text.as_deref(), Some("bad words"));
    }

    #[test]
    fn not_flagged_has_no_text() {
        let m = Moderation::not_flagged();
        assert!(!m.flagged);
        assert!(m.flagged_text.is_none());
    }
}
