//! Per-method dispatcher — the orchestration path of one invocation.
//!
//! Everything derivable from the method signature (template text, format
//! instruction, return shape) is resolved at service build time; `dispatch`
//! only binds arguments, composes the request, runs the moderation gate,
//! calls the model, parses the reply, and persists to memory.

use tracing::{debug, trace, warn};

use crate::error::ServiceError;
use crate::memory::SharedMemory;
use crate::message::Message;
use crate::model::ChatModel;
use crate::moderation::ModerationModel;
use crate::parse::parse;
use crate::request::{apply_transformers, RequestBuilder, RequestParameters, RequestTransformer};
use crate::schema::TypeDescriptor;
use crate::service::ServiceResult;
use crate::template::{resolve, Args};

/// Collaborators shared by every method of one service.
pub(crate) struct ServiceCore {
    pub(crate) model: Box<dyn ChatModel>,
    pub(crate) moderation: Option<Box<dyn ModerationModel>>,
    pub(crate) memory: Option<SharedMemory>,
    pub(crate) transformers: Vec<RequestTransformer>,
    /// Seed parameters queried from the model's metadata at build time.
    pub(crate) default_parameters: RequestParameters,
}

/// One method's precomputed dispatch state.
pub(crate) struct Dispatcher {
    pub(crate) name: String,
    /// Resolved system template text, placeholders still unbound.
    pub(crate) system_template: Option<String>,
    /// Resolved user template text; defaults to the bare sentinel.
    pub(crate) user_template: String,
    pub(crate) return_type: TypeDescriptor,
    /// Format instruction derived once from `return_type`.
    pub(crate) instruction: Option<String>,
    pub(crate) moderated: bool,
}

impl Dispatcher {
    pub(crate) fn dispatch(
        &self,
        core: &ServiceCore,
        args: &Args,
    ) -> Result<ServiceResult, ServiceError> {
        debug!(method = %self.name, "dispatching");

        // A structured prompt supplies the user template for this call;
        // otherwise the method's declared template is used.
        let user_text = match args.structured() {
            Some(prompt) => resolve(&prompt.template, args)?,
            None => resolve(&self.user_template, args)?,
        };
        let system_text = self
            .system_template
            .as_deref()
            .map(|template| resolve(template, args))
            .transpose()?;

        let history = match &core.memory {
            Some(memory) => lock(memory).messages(),
            None => Vec::new(),
        };

        let mut builder = RequestBuilder::new(core.default_parameters.clone());
        if let Some(system) = system_text {
            builder = builder.system(system);
        }
        let request = builder
            .history(history)
            .user(user_text, self.instruction.as_deref())
            .build();
        let request = apply_transformers(request, &core.transformers);
        trace!(method = %self.name, messages = request.messages.len(), "composed request");

        // Sequential gate: a flagged outcome aborts before the model call,
        // so its answer can never be surfaced or persisted.
        if self.moderated {
            let gate = core.moderation.as_ref().ok_or_else(|| {
                ServiceError::Configuration(format!(
                    "method '{}' is moderated but no moderation model is configured",
                    self.name
                ))
            })?;
            let outbound = request.user_message().cloned().ok_or_else(|| {
                ServiceError::Configuration("no user message to moderate".into())
            })?;
            let moderation = gate.moderate(std::slice::from_ref(&outbound))?;
            if moderation.flagged {
                warn!(method = %self.name, "outbound text flagged by moderation");
                return Err(ServiceError::Moderation(moderation));
            }
        }

        let response = core.model.chat(&request)?;
        debug!(
            method = %self.name,
            usage = ?response.token_usage,
            finish = ?response.finish_reason,
            "received model reply"
        );

        let content = parse(&response.content, &self.return_type)?;

        // Persist only after a fully successful call, outbound before reply.
        if let Some(memory) = &core.memory {
            let mut guard = lock(memory);
            if let Some(user) = request.user_message().cloned() {
                guard.append(user);
            }
            guard.append(Message::assistant(response.content.clone()));
        }

        Ok(ServiceResult {
            content,
            token_usage: response.token_usage,
            sources: response.sources,
        })
    }
}

/// Lock a shared memory handle, tolerating a poisoned mutex — the store
/// holds plain data and stays usable after a panicked writer.
fn lock(memory: &SharedMemory) -> std::sync::MutexGuard<'_, dyn crate::memory::ChatMemory + 'static> {
    memory.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
