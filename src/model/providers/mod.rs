//! Bundled model backends.
//!
//! `build(config, api_key)` is the factory — called at assembly time.
//! Adding a new backend = new module + new variant + new match arms.
//!
//! Enum dispatch avoids `dyn` indirection for the bundled set while the
//! [`ChatModel`] impl keeps the enum usable wherever a boxed port is
//! expected.

pub mod echo;
pub mod openai_compatible;

use crate::config::LlmConfig;
use crate::error::{PortError, ServiceError};
use crate::model::{ChatModel, ChatResponse, ModelMetadata};
use crate::request::ChatRequest;

/// All bundled backends.
#[derive(Debug, Clone)]
pub enum ChatProvider {
    Echo(echo::EchoModel),
    OpenAiCompatible(openai_compatible::OpenAiCompatibleModel),
}

/// Construct a backend from config and an optional API key.
///
/// `api_key` is sourced from the `LLM_API_KEY` env var (never TOML) and is
/// `None` for keyless local models.
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<ChatProvider, ServiceError> {
    match config.provider.as_str() {
        "echo" => Ok(ChatProvider::Echo(echo::EchoModel)),
        "openai" | "openai-compatible" => {
            let oai = &config.openai;
            let model = openai_compatible::OpenAiCompatibleModel::new(
                oai.api_base_url.clone(),
                oai.model.clone(),
                oai.temperature,
                oai.timeout_seconds,
                api_key,
            )?;
            Ok(ChatProvider::OpenAiCompatible(model))
        }
        other => Err(ServiceError::Configuration(format!("unknown model provider: {other}"))),
    }
}

impl ChatModel for ChatProvider {
    fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, PortError> {
        match self {
            ChatProvider::Echo(m) => m.chat(request),
            ChatProvider::OpenAiCompatible(m) => m.chat(request),
        }
    }

    fn metadata(&self) -> ModelMetadata {
        match self {
            ChatProvider::Echo(m) => m.metadata(),
            ChatProvider::OpenAiCompatible(m) => m.metadata(),
        }
    }
}
