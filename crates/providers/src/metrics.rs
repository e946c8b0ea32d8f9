//! HTTP client for the admin backend's metrics endpoints.

use async_trait::async_trait;
use fleetwise_core::error::MetricsError;
use fleetwise_core::metrics::MetricsSource;
use fleetwise_core::stats::{BusinessStats, ExtendedAnalytics};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const STATS_PATH: &str = "/users/admin/stats";
const ANALYTICS_PATH: &str = "/users/admin/analytics";

/// Reads `/users/admin/stats` and `/users/admin/analytics`, forwarding the
/// caller's `Authorization` header.
pub struct HttpMetricsSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpMetricsSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, MetricsError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MetricsError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &fleetwise_config::AppConfig) -> Result<Self, MetricsError> {
        Self::new(
            &config.metrics.base_url,
            Duration::from_secs(config.metrics.timeout_secs),
        )
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        credential: Option<&str>,
    ) -> Result<T, MetricsError> {
        let url = format!("{}{endpoint}", self.base_url);
        debug!(url = %url, authorized = credential.is_some(), "Fetching metrics");

        let mut request = self.client.get(&url);
        if let Some(credential) = credential {
            request = request.header("Authorization", credential);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MetricsError::Timeout(format!("{endpoint}: {e}"))
            } else {
                MetricsError::Network(format!("{endpoint}: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetricsError::Status {
                endpoint: endpoint.to_string(),
                status_code: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| MetricsError::InvalidPayload {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl MetricsSource for HttpMetricsSource {
    async fn business_stats(&self, credential: Option<&str>) -> Result<BusinessStats, MetricsError> {
        self.fetch(STATS_PATH, credential).await
    }

    async fn extended_analytics(
        &self,
        credential: Option<&str>,
    ) -> Result<ExtendedAnalytics, MetricsError> {
        let raw: ExtendedAnalytics = self.fetch(ANALYTICS_PATH, credential).await?;
        Ok(raw.with_derived_rates())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(server: &MockServer) -> HttpMetricsSource {
        HttpMetricsSource::new(format!("{}/api/", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn stats_forward_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/admin/stats"))
            .and(header("Authorization", "Bearer admin-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalOrders": 42,
                "totalRevenue": 12500000,
                "totalCars": 15,
                "rentedCars": 6
            })))
            .expect(1)
            .mount(&server)
            .await;

        let stats = source(&server)
            .business_stats(Some("Bearer admin-token"))
            .await
            .unwrap();
        assert_eq!(stats.total_orders, Some(42));
        assert_eq!(stats.total_revenue, Some(12_500_000.0));
        assert_eq!(stats.rented_cars, Some(6));
    }

    #[tokio::test]
    async fn analytics_get_derived_rates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/admin/analytics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalOrders": 20,
                "websiteVisitors": 400,
                "rentedCars": 3,
                "totalCars": 12,
                "repeatCustomers": 5,
                "totalCustomers": 0,
                "topChannels": ["Instagram", "WhatsApp"]
            })))
            .mount(&server)
            .await;

        let analytics = source(&server).extended_analytics(None).await.unwrap();
        assert_eq!(analytics.conversion_rate, Some(0.05));
        assert_eq!(analytics.utilization_rate, Some(0.25));
        assert_eq!(analytics.repeat_rate, Some(5.0));
        assert_eq!(analytics.top_channels, vec!["Instagram", "WhatsApp"]);
    }

    #[tokio::test]
    async fn null_lists_do_not_discard_analytics() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/admin/analytics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalOrders": 20,
                "websiteVisitors": 400,
                "popularCars": null,
                "peakHours": [{"hour": 14.5, "count": 3}],
                "topChannels": ["Instagram"]
            })))
            .mount(&server)
            .await;

        let analytics = source(&server).extended_analytics(None).await.unwrap();
        assert_eq!(analytics.conversion_rate, Some(0.05));
        assert!(analytics.popular_cars.is_empty());
        assert_eq!(analytics.peak_hour().unwrap().hour.as_ref().unwrap().to_string(), "14.5");
        assert_eq!(analytics.top_channels, vec!["Instagram"]);
    }

    #[tokio::test]
    async fn unauthorized_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(serde_json::json!({"message": "Unauthorized"})),
            )
            .mount(&server)
            .await;

        let err = source(&server).business_stats(None).await.unwrap_err();
        assert!(matches!(
            err,
            MetricsError::Status {
                status_code: 401,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn html_body_is_invalid_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<!doctype html>"))
            .mount(&server)
            .await;

        let err = source(&server).extended_analytics(None).await.unwrap_err();
        assert!(matches!(err, MetricsError::InvalidPayload { .. }));
    }
}
