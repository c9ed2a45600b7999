//! Chat request composition.
//!
//! A request is the ordered message list plus an opaque parameter bag. The
//! builder lays messages out in conversation order — system first, then any
//! prior history, then the user message with its format instruction — and
//! runs the registered transformer chain over the finished request.

use std::collections::BTreeMap;

use crate::message::Message;

// ── Wire shape ────────────────────────────────────────────────────────────────

/// Parameters forwarded to the model port untouched.
///
/// The core never interprets these; providers map them onto their own wire
/// format and ignore what they do not understand.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestParameters {
    pub temperature: Option<f32>,
    /// Response-format hint, e.g. `"json_object"`.
    pub response_format: Option<String>,
    /// Anything else, keyed by provider-specific parameter name.
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One composed model call: ordered messages plus parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub parameters: RequestParameters,
}

impl ChatRequest {
    /// The last user message, if any — the outbound text of this call.
    pub fn user_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::message::Role::User)
    }
}

// ── Transformers ──────────────────────────────────────────────────────────────

/// A user-registered request rewrite step.
///
/// Transformers run synchronously in registration order, each receiving and
/// returning a full request. They must not touch shared state: composition
/// may be re-run by an external retry and has to stay deterministic.
pub type RequestTransformer = Box<dyn Fn(ChatRequest) -> ChatRequest + Send + Sync>;

pub(crate) fn apply_transformers(
    mut request: ChatRequest,
    transformers: &[RequestTransformer],
) -> ChatRequest {
    for transform in transformers {
        request = transform(request);
    }
    request
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Assembles the ordered message list for one invocation.
pub struct RequestBuilder {
    messages: Vec<Message>,
    parameters: RequestParameters,
}

impl RequestBuilder {
    pub fn new(parameters: RequestParameters) -> Self {
        Self { messages: Vec::new(), parameters }
    }

    /// System message, emitted first when declared.
    pub fn system(mut self, text: impl Into<String>) -> Self {
        self.messages.push(Message::system(text));
        self
    }

    /// Prior conversation history, in stored order.
    pub fn history(mut self, messages: Vec<Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// The user message; a non-empty format instruction is appended after a
    /// single newline.
    pub fn user(mut self, text: impl Into<String>, instruction: Option<&str>) -> Self {
        let text = text.into();
        let content = match instruction {
            Some(instruction) if !instruction.is_empty() => format!("{text}\n{instruction}"),
            _ => text,
        };
        self.messages.push(Message::user(content));
        self
    }

    pub fn build(self) -> ChatRequest {
        ChatRequest { messages: self.messages, parameters: self.parameters }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    #[test]
    fn message_order_is_system_history_user() {
        let request = RequestBuilder::new(RequestParameters::default())
            .system("You are a chef")
            .history(vec![Message::user("hi"), Message::assistant("hello")])
            .user("How long should I grill chicken?", None)
            .build();
        let roles: Vec<Role> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
    }

    #[test]
    fn instruction_is_appended_after_newline() {
        let request = RequestBuilder::new(RequestParameters::default())
            .user("Count the eggs", Some("You must answer strictly in the following format: integer number"))
            .build();
        assert_eq!(
            request.messages[0].content,
            "Count the eggs\nYou must answer strictly in the following format: integer number"
        );
    }

    #[test]
    fn empty_instruction_leaves_user_text_alone() {
        let request = RequestBuilder::new(RequestParameters::default())
            .user("Tell me a joke about AI", None)
            .build();
        assert_eq!(request.messages[0].content, "Tell me a joke about AI");
    }

    #[test]
    fn transformers_run_in_registration_order() {
        let transformers: Vec<RequestTransformer> = vec![
            Box::new(|mut r: ChatRequest| {
                r.messages[0].content.push('a');
                r
            }),
            Box::new(|mut r: ChatRequest| {
                r.messages[0].content.push('b');
                r
            }),
        ];
        let request = RequestBuilder::new(RequestParameters::default())
            .user("x", None)
            .build();
        let rewritten = apply_transformers(request, &transformers);
        assert_eq!(rewritten.messages[0].content, "xab");
    }

    #[test]
    fn identity_transformer_leaves_request_unchanged() {
        let transformers: Vec<RequestTransformer> = vec![Box::new(|r| r)];
        let request = RequestBuilder::new(RequestParameters::default())
            .user("x", None)
            .build();
        let expected = request.clone();
        assert_eq!(apply_transformers(request, &transformers), expected);
    }

    #[test]
    fn user_message_finds_trailing_user_role() {
        let request = RequestBuilder::new(RequestParameters::default())
            .system("sys")
            .history(vec![Message::user("old"), Message::assistant("past")])
            .user("new", None)
            .build();
        assert_eq!(request.user_message().unwrap().content, "new");
    }
}
