//! Error types for the Fleetwise domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each external collaborator has its own error enum.

use thiserror::Error;

/// The top-level error type for Fleetwise operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Metrics errors ---
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures talking to the completion provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider")]
    RateLimited { body: String },

    #[error("Authentication failed: invalid API key or insufficient permissions (status: {status_code})")]
    AuthenticationFailed { status_code: u16, body: String },

    /// The provider answered successfully but without a usable choice.
    #[error("Provider returned no usable choice")]
    EmptyResponse,

    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Whether the provider rejected the request with a JSON body. The
    /// provider answered in that case, just without a completion.
    pub fn is_json_rejection(&self) -> bool {
        let body = match self {
            Self::ApiError { message, .. } => message,
            Self::RateLimited { body } | Self::AuthenticationFailed { body, .. } => body,
            _ => return false,
        };
        serde_json::from_str::<serde_json::Value>(body).is_ok()
    }
}

/// Failures fetching business metrics.
#[derive(Debug, Clone, Error)]
pub enum MetricsError {
    #[error("Metrics endpoint {endpoint} returned status {status_code}")]
    Status { endpoint: String, status_code: u16 },

    #[error("Malformed metrics payload from {endpoint}: {reason}")]
    InvalidPayload { endpoint: String, reason: String },

    #[error("Metrics request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 502,
            message: "Bad Gateway".into(),
        });
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn json_rejections_are_recognised() {
        let rate_limited = ProviderError::RateLimited {
            body: r#"{"error":{"message":"rate limited","code":429}}"#.into(),
        };
        assert!(rate_limited.is_json_rejection());

        let html = ProviderError::ApiError {
            status_code: 502,
            message: "<html>Bad Gateway</html>".into(),
        };
        assert!(!html.is_json_rejection());

        let no_body = ProviderError::AuthenticationFailed {
            status_code: 401,
            body: String::new(),
        };
        assert!(!no_body.is_json_rejection());
        assert!(!ProviderError::Network("refused".into()).is_json_rejection());
    }

    #[test]
    fn metrics_error_names_endpoint() {
        let err = Error::Metrics(MetricsError::Status {
            endpoint: "/users/admin/stats".into(),
            status_code: 401,
        });
        assert!(err.to_string().contains("/users/admin/stats"));
        assert!(err.to_string().contains("401"));
    }
}
