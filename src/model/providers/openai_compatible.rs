//! OpenAI-compatible chat completion backend (`/v1/chat/completions`).
//!
//! Covers OpenAI, OpenAI-compatible local servers (Ollama, LM Studio…),
//! and hosted alternatives. All wire types are private to this module —
//! callers only ever see [`ChatRequest`] and [`ChatResponse`]. Constructed
//! once at assembly, then cheaply cloned because `reqwest::blocking::Client`
//! is an `Arc` internally.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::error::PortError;
use crate::model::{Capability, ChatModel, ChatResponse, FinishReason, ModelMetadata, TokenUsage};
use crate::request::{ChatRequest, RequestParameters};

// ── Public provider ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleModel {
    client: Client,
    api_base_url: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl OpenAiCompatibleModel {
    /// Build a backend from config values and an optional API key.
    ///
    /// `api_key` is `None` for keyless local models. When present it is sent
    /// as `Authorization: Bearer <key>` on every request.
    pub fn new(
        api_base_url: String,
        model: String,
        temperature: f32,
        timeout_seconds: u64,
        api_key: Option<String>,
    ) -> Result<Self, PortError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| PortError::new(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, api_base_url, model, temperature, api_key })
    }
}

impl ChatModel for OpenAiCompatibleModel {
    fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, PortError> {
        // Some models (gpt-5 family) do not accept a temperature parameter.
        let temperature = if self.model.starts_with("gpt-5") {
            None
        } else {
            request.parameters.temperature.or(Some(self.temperature))
        };

        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage { role: m.role.as_str(), content: &m.content })
                .collect(),
            temperature,
            response_format: request
                .parameters
                .response_format
                .as_deref()
                .map(|kind| ResponseFormat { kind }),
        };

        debug!(
            model = %self.model,
            temperature = ?payload.temperature,
            messages = payload.messages.len(),
            "sending chat request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full chat request payload");
        }

        let mut req = self.client.post(&self.api_base_url).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().map_err(|e| {
            error!(url = %self.api_base_url, error = %e, "chat HTTP request failed (transport)");
            PortError::new(e.to_string())
        })?;

        let response = check_status(response)?;

        let parsed = response.json::<ChatCompletionResponse>().map_err(|e| {
            error!(error = %e, "failed to deserialize chat response");
            PortError::new(format!("failed to parse response body: {e}"))
        })?;

        debug!(choices = parsed.choices.len(), "received chat response");

        let usage = parsed.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PortError::new("no choices in response"))?;

        let finish_reason = choice.finish_reason.map(|r| match r.as_str() {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "content_filter" => FinishReason::ContentFilter,
            other => FinishReason::Other(other.to_string()),
        });

        let content = choice
            .message
            .content
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| PortError::new("empty or missing content in response"))?;

        Ok(ChatResponse {
            content,
            token_usage: usage,
            finish_reason,
            sources: Vec::new(),
        })
    }

    fn metadata(&self) -> ModelMetadata {
        ModelMetadata {
            provider: "openai-compatible".into(),
            capabilities: vec![Capability::JsonResponseFormat],
            default_parameters: RequestParameters {
                temperature: Some(self.temperature),
                ..RequestParameters::default()
            },
        }
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<UsageData>,
}

#[derive(Debug, Deserialize)]
struct UsageData {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// Error envelope used by OpenAI and compatible APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Consume the response and return it if successful, or a structured error.
fn check_status(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, PortError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(&body) {
        let code = env
            .error
            .code
            .map(|v| match v {
                serde_json::Value::String(s) => format!(" [code={s}]"),
                other => format!(" [code={other}]"),
            })
            .unwrap_or_default();
        format!("HTTP {status}{code}: {}", env.error.message)
    } else {
        format!("HTTP {status}: {body}")
    };

    error!(%status, %message, "chat request returned HTTP error");
    Err(PortError::new(message))
}
