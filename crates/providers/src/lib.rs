//! Outbound collaborators for Fleetwise.
//!
//! - [`OpenAiCompatProvider`] implements `fleetwise_core::Provider` against an
//!   OpenRouter-compatible chat-completions endpoint.
//! - [`HttpMetricsSource`] implements `fleetwise_core::MetricsSource` against
//!   the admin backend.
//! - [`CompletionGateway`] wraps any provider in the primary-then-fallback
//!   protocol.

pub mod fallback;
pub mod metrics;
pub mod openai_compat;

pub use fallback::{CompletionGateway, CompletionOutcome, OutcomeSource};
pub use metrics::HttpMetricsSource;
pub use openai_compat::OpenAiCompatProvider;
