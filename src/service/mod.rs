//! Service assembly — a declarative method table over a chat model.
//!
//! A service is built once from explicit per-method configuration
//! ([`MethodSpec`]) plus its collaborator ports, and dispatched by method
//! name afterwards. All template loading, blank-template validation, and
//! format-instruction derivation happen in [`AiServiceBuilder::build`];
//! invocation-time failures are limited to argument binding, moderation,
//! the model call, and parsing.

mod dispatcher;

use std::collections::HashMap;

use tracing::debug;

use crate::error::ServiceError;
use crate::memory::SharedMemory;
use crate::model::{ChatModel, TokenUsage};
use crate::moderation::ModerationModel;
use crate::parse::ResponseValue;
use crate::request::{ChatRequest, RequestTransformer};
use crate::resource::ResourceLoader;
use crate::schema::TypeDescriptor;
use crate::template::{Args, TemplateSpec};

use dispatcher::{Dispatcher, ServiceCore};

// ── Result envelope ───────────────────────────────────────────────────────────

/// Parsed content plus call metadata.
///
/// `sources` is empty when no retrieval contributed to the answer;
/// `token_usage.total_tokens()` is the sum of input and output by
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResult {
    pub content: ResponseValue,
    pub token_usage: Option<TokenUsage>,
    pub sources: Vec<String>,
}

// ── Method table ──────────────────────────────────────────────────────────────

/// Declarative configuration of one service method.
#[derive(Debug, Clone)]
pub struct MethodSpec {
    name: String,
    return_type: TypeDescriptor,
    system_template: Option<TemplateSpec>,
    user_template: Option<TemplateSpec>,
    moderated: bool,
}

impl MethodSpec {
    pub fn new(name: impl Into<String>, return_type: impl Into<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            system_template: None,
            user_template: None,
            moderated: false,
        }
    }

    pub fn system_template(mut self, spec: TemplateSpec) -> Self {
        self.system_template = Some(spec);
        self
    }

    /// When no user template is declared, the method falls back to the bare
    /// sentinel: the single unnamed argument becomes the user message.
    pub fn user_template(mut self, spec: TemplateSpec) -> Self {
        self.user_template = Some(spec);
        self
    }

    /// Gate this method's outbound text through the moderation model.
    pub fn moderated(mut self) -> Self {
        self.moderated = true;
        self
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct AiServiceBuilder {
    model: Option<Box<dyn ChatModel>>,
    moderation: Option<Box<dyn ModerationModel>>,
    memory: Option<SharedMemory>,
    loader: Option<Box<dyn ResourceLoader>>,
    transformers: Vec<RequestTransformer>,
    methods: Vec<MethodSpec>,
}

impl AiServiceBuilder {
    pub fn chat_model(mut self, model: impl ChatModel + 'static) -> Self {
        self.model = Some(Box::new(model));
        self
    }

    pub fn moderation_model(mut self, gate: impl ModerationModel + 'static) -> Self {
        self.moderation = Some(Box::new(gate));
        self
    }

    pub fn memory(mut self, memory: SharedMemory) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn resource_loader(mut self, loader: impl ResourceLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Register a request transformer; the chain runs in registration order.
    pub fn request_transformer(
        mut self,
        transform: impl Fn(ChatRequest) -> ChatRequest + Send + Sync + 'static,
    ) -> Self {
        self.transformers.push(Box::new(transform));
        self
    }

    pub fn method(mut self, spec: MethodSpec) -> Self {
        self.methods.push(spec);
        self
    }

    /// Validate the table and assemble the service.
    ///
    /// Fails fast with a `ConfigurationError` on a missing model, an
    /// unknown/empty/missing template resource, a moderated method without
    /// a gate, or a duplicate method name.
    pub fn build(self) -> Result<AiService, ServiceError> {
        let model = self
            .model
            .ok_or_else(|| ServiceError::Configuration("a chat model is required".into()))?;

        // Metadata is configuration input only: queried once, here.
        let default_parameters = model.metadata().default_parameters;

        let mut methods = HashMap::with_capacity(self.methods.len());
        for spec in self.methods {
            if spec.moderated && self.moderation.is_none() {
                return Err(ServiceError::Configuration(format!(
                    "method '{}' is moderated but no moderation model is configured",
                    spec.name
                )));
            }

            let system_template = spec
                .system_template
                .as_ref()
                .map(|t| load_template("system", t, self.loader.as_deref()))
                .transpose()?;
            let user_template = match &spec.user_template {
                Some(t) => load_template("user", t, self.loader.as_deref())?,
                None => format!("{{{{{}}}}}", crate::template::SENTINEL),
            };

            let instruction = spec.return_type.format_instruction();
            debug!(method = %spec.name, has_instruction = instruction.is_some(), "method registered");

            let dispatcher = Dispatcher {
                name: spec.name.clone(),
                system_template,
                user_template,
                return_type: spec.return_type,
                instruction,
                moderated: spec.moderated,
            };
            if methods.insert(spec.name.clone(), dispatcher).is_some() {
                return Err(ServiceError::Configuration(format!(
                    "duplicate method name: {}",
                    spec.name
                )));
            }
        }

        Ok(AiService {
            core: ServiceCore {
                model,
                moderation: self.moderation,
                memory: self.memory,
                transformers: self.transformers,
                default_parameters,
            },
            methods,
        })
    }
}

/// Materialize a template spec into literal text, failing on missing
/// resources and blank text.
fn load_template(
    role: &str,
    spec: &TemplateSpec,
    loader: Option<&dyn ResourceLoader>,
) -> Result<String, ServiceError> {
    let text = match spec {
        TemplateSpec::Inline(text) => text.clone(),
        TemplateSpec::Resource(path) => {
            let loader = loader.ok_or_else(|| {
                ServiceError::Configuration(format!(
                    "{role} template resource '{path}' requires a resource loader"
                ))
            })?;
            loader.load(path).ok_or_else(|| {
                ServiceError::Configuration(format!("{role} template resource '{path}' not found"))
            })?
        }
    };
    if text.trim().is_empty() {
        return Err(ServiceError::Configuration(format!(
            "{role} template cannot be empty"
        )));
    }
    Ok(text)
}

// ── Service ───────────────────────────────────────────────────────────────────

/// A built service: one dispatcher per declared method, shared collaborator
/// ports, dispatched by name.
pub struct AiService {
    core: ServiceCore,
    methods: HashMap<String, Dispatcher>,
}

impl std::fmt::Debug for AiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiService")
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AiService {
    pub fn builder() -> AiServiceBuilder {
        AiServiceBuilder::default()
    }

    /// Invoke a method and return the bare parsed content.
    pub fn invoke(&self, method: &str, args: Args) -> Result<ResponseValue, ServiceError> {
        self.invoke_full(method, args).map(|result| result.content)
    }

    /// Invoke a method and return the full [`ServiceResult`] envelope.
    pub fn invoke_full(&self, method: &str, args: Args) -> Result<ServiceResult, ServiceError> {
        let dispatcher = self.methods.get(method).ok_or_else(|| {
            ServiceError::Configuration(format!("unknown method: {method}"))
        })?;
        dispatcher.dispatch(&self.core, &args)
    }
}
