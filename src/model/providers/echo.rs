//! Echo model — replies with the last user message prefixed `[echo]`.
//! Used for exercising the full dispatch path without a real API key.

use crate::error::PortError;
use crate::model::{ChatModel, ChatResponse, ModelMetadata};
use crate::request::ChatRequest;

#[derive(Debug, Clone, Default)]
pub struct EchoModel;

impl ChatModel for EchoModel {
    fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, PortError> {
        let content = request
            .user_message()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        Ok(ChatResponse::from_text(format!("[echo] {content}")))
    }

    fn metadata(&self) -> ModelMetadata {
        ModelMetadata { provider: "echo".into(), ..ModelMetadata::default() }
    }
}
