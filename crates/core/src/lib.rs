//! # Fleetwise Core
//!
//! Domain types, traits, and error definitions for the Fleetwise business
//! assistant. This crate has **zero framework dependencies**: it defines the
//! domain model that all other crates implement against.
//!
//! Every external collaborator (the completion provider, the business-metrics
//! source) is a trait here. Implementations live in `fleetwise-providers`, and
//! tests substitute deterministic fakes.

pub mod error;
pub mod message;
pub mod metrics;
pub mod provider;
pub mod stats;

// Re-export key types at crate root for ergonomics
pub use error::{Error, MetricsError, ProviderError, Result};
pub use message::{Message, Role};
pub use metrics::MetricsSource;
pub use provider::{Provider, ProviderRequest, ProviderResponse, ResponseFormat, Usage};
pub use stats::{BusinessStats, ExtendedAnalytics, HourLabel, PeakHour, PopularCar};
