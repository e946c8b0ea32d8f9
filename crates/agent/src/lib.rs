//! The chat orchestration pipeline: the heart of Fleetwise.
//!
//! A chat turn runs through these stages:
//!
//! 1. **Resolve metrics** from the request context, or fetch them
//! 2. **Compose** the system prompt from those metrics
//! 3. **Assemble** the message history
//! 4. **Select** a model and a `max_tokens` ceiling
//! 5. **Complete** through the primary-then-fallback gateway
//! 6. **Enhance** the text with reference and strategy footers
//! 7. **Extract** suggested actions and quick replies
//!
//! Every stage except the completion call and the metrics fetch is a pure
//! function and can be tested on its own.

pub mod context;
pub mod enhancer;
pub mod insights;
pub mod model;
pub mod pipeline;

pub use model::ModelSelector;
pub use pipeline::{
    ChatError, ChatPipeline, ChatRequest, ConversationContext, EnhancedReply, ReplyContext,
};
