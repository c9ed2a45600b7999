//! Sibyl — a typed service layer over chat language models.
//!
//! A method call becomes a composed prompt; the model's free-text (or JSON)
//! reply becomes a typed value. The crate is a codec for an open set of
//! target shapes — primitives, date/time, described enums, collections,
//! maps, nested records — plus the per-call orchestration that wires it to
//! a model: template resolution, format-instruction derivation, moderation
//! gating, memory folding, request rewriting, and response parsing.
//!
//! ```no_run
//! use sibyl::{AiService, Args, MethodSpec, TemplateSpec, TypeDescriptor};
//! use sibyl::model::providers::echo::EchoModel;
//!
//! let service = AiService::builder()
//!     .chat_model(EchoModel)
//!     .method(
//!         MethodSpec::new("count_eggs", TypeDescriptor::int()).user_template(
//!             TemplateSpec::inline("Count the number of eggs mentioned in this sentence:\n{{it}}"),
//!         ),
//!     )
//!     .build()?;
//!
//! let count = service.invoke("count_eggs", Args::it("ten eggs and three more"))?;
//! # Ok::<(), sibyl::ServiceError>(())
//! ```
//!
//! The model, moderation classifier, conversation memory, and template
//! resources are externally supplied ports; each owns its own transport
//! and retry policy. The core is a thin synchronous orchestrator over them.

pub mod config;
pub mod error;
pub mod logger;
pub mod memory;
pub mod message;
pub mod model;
pub mod moderation;
pub mod parse;
pub mod request;
pub mod resource;
pub mod schema;
pub mod service;
pub mod template;

pub use error::{PortError, ServiceError};
pub use memory::{ChatMemory, MessageWindowMemory, SharedMemory};
pub use message::{Message, Role};
pub use model::{ChatModel, ChatResponse, FinishReason, ModelMetadata, TokenUsage};
pub use moderation::{Moderation, ModerationModel};
pub use parse::ResponseValue;
pub use request::{ChatRequest, RequestParameters};
pub use resource::{FsResourceLoader, ResourceLoader};
pub use schema::{EnumType, PrimitiveKind, RecordType, TypeDescriptor};
pub use service::{AiService, AiServiceBuilder, MethodSpec, ServiceResult};
pub use template::{Args, StructuredPrompt, TemplateSpec, TemplateValue};
