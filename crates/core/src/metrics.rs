//! MetricsSource trait: read-only access to the admin backend's metrics.

use async_trait::async_trait;

use crate::error::MetricsError;
use crate::stats::{BusinessStats, ExtendedAnalytics};

/// Where business metrics come from.
///
/// `credential` is the caller's opaque `Authorization` header value; it is
/// forwarded as-is and never inspected.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Aggregate order, revenue and fleet counts.
    async fn business_stats(&self, credential: Option<&str>) -> Result<BusinessStats, MetricsError>;

    /// Secondary analytics with derived rates already filled in.
    async fn extended_analytics(
        &self,
        credential: Option<&str>,
    ) -> Result<ExtendedAnalytics, MetricsError>;
}
