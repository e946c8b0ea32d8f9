//! Completion gateway: one primary attempt, one fallback attempt, then a
//! fixed apology.
//!
//! ```text
//! PRIMARY_ATTEMPT ──ok──────────────────────────────▶ SUCCESS
//!        │ any failure
//!        ▼
//! FALLBACK_ATTEMPT ──ok─────────────────────────────▶ SUCCESS
//!        │ no usable choice, or a JSON rejection ───▶ generic error text
//!        │ any other failure
//!        ▼
//! TOTAL_FAILURE ──▶ apology text
//! ```
//!
//! The gateway never returns an error: every path ends in text. Each attempt
//! is bounded by a timeout, and there is no retry inside an attempt.

use fleetwise_core::error::ProviderError;
use fleetwise_core::message::Message;
use fleetwise_core::provider::{Provider, ProviderRequest, ProviderResponse, ResponseFormat};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Returned when both attempts fail.
pub const APOLOGY_TEXT: &str =
    "Sistem sedang mengalami gangguan. Silakan coba beberapa saat lagi atau hubungi tim support.";

/// Returned when the fallback model answers without a usable choice, including
/// a rejection that still carries a JSON body.
pub const FALLBACK_EMPTY_TEXT: &str = "Maaf, sedang ada gangguan teknis. Silakan coba lagi nanti.";

pub const PRIMARY_TEMPERATURE: f32 = 0.7;
pub const PRIMARY_TOP_P: f32 = 0.9;

/// Which terminal state produced the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeSource {
    /// The primary model answered.
    Primary { model: String },
    /// The primary failed and the fallback model answered.
    Fallback { model: String },
    /// The fallback model answered without a usable choice.
    FallbackEmpty,
    /// Both attempts failed.
    TotalFailure,
}

/// Text produced by the gateway plus where it came from.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub text: String,
    pub source: OutcomeSource,
}

impl CompletionOutcome {
    /// Whether a model actually generated the text.
    pub fn is_generated(&self) -> bool {
        matches!(
            self.source,
            OutcomeSource::Primary { .. } | OutcomeSource::Fallback { .. }
        )
    }
}

/// Primary-then-fallback caller over a single [`Provider`].
pub struct CompletionGateway {
    provider: Arc<dyn Provider>,
    fallback_model: String,
    fallback_max_tokens: u32,
    timeout: Duration,
}

impl CompletionGateway {
    pub fn new(provider: Arc<dyn Provider>, fallback_model: impl Into<String>) -> Self {
        Self {
            provider,
            fallback_model: fallback_model.into(),
            fallback_max_tokens: 512,
            timeout: Duration::from_secs(60),
        }
    }

    /// Build from the model table and provider timeout in `config`.
    pub fn from_config(provider: Arc<dyn Provider>, config: &fleetwise_config::AppConfig) -> Self {
        Self::new(provider, &config.models.fallback)
            .with_fallback_max_tokens(config.models.fallback_max_tokens)
            .with_timeout(Duration::from_secs(config.provider.timeout_secs))
    }

    pub fn with_fallback_max_tokens(mut self, max_tokens: u32) -> Self {
        self.fallback_max_tokens = max_tokens;
        self
    }

    /// Per-attempt timeout. Expiry is treated as a transport failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn fallback_model(&self) -> &str {
        &self.fallback_model
    }

    /// Run the protocol. Makes at most two provider calls.
    pub async fn complete(
        &self,
        model: &str,
        messages: Vec<Message>,
        max_tokens: u32,
    ) -> CompletionOutcome {
        let primary = ProviderRequest::new(model, messages.clone(), max_tokens)
            .with_temperature(PRIMARY_TEMPERATURE)
            .with_top_p(PRIMARY_TOP_P)
            .with_response_format(ResponseFormat::Text);

        info!(
            provider = %self.provider.name(),
            model = %model,
            max_tokens,
            "Completion: primary attempt"
        );

        let primary_error = match self.attempt(primary).await {
            Ok(response) => {
                return CompletionOutcome {
                    text: response.content,
                    source: OutcomeSource::Primary {
                        model: response.model,
                    },
                };
            }
            Err(e) => e,
        };

        warn!(
            model = %model,
            fallback = %self.fallback_model,
            error = %primary_error,
            "Primary model failed, falling back"
        );

        let fallback = ProviderRequest::new(&self.fallback_model, messages, self.fallback_max_tokens);

        match self.attempt(fallback).await {
            Ok(response) => CompletionOutcome {
                text: response.content,
                source: OutcomeSource::Fallback {
                    model: response.model,
                },
            },
            Err(e) if matches!(e, ProviderError::EmptyResponse) || e.is_json_rejection() => {
                warn!(model = %self.fallback_model, error = %e, "Fallback model returned no usable choice");
                CompletionOutcome {
                    text: FALLBACK_EMPTY_TEXT.to_string(),
                    source: OutcomeSource::FallbackEmpty,
                }
            }
            Err(e) => {
                error!(model = %self.fallback_model, error = %e, "Fallback also failed");
                CompletionOutcome {
                    text: APOLOGY_TEXT.to_string(),
                    source: OutcomeSource::TotalFailure,
                }
            }
        }
    }

    async fn attempt(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        match tokio::time::timeout(self.timeout, self.provider.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(format!(
                "Provider '{}' timed out after {}ms",
                self.provider.name(),
                self.timeout.as_millis()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays one scripted result per call and records every request.
    struct ScriptedProvider {
        script: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
        requests: Mutex<Vec<ProviderRequest>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
            Self {
                script: Mutex::new(script),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn request(&self, i: usize) -> ProviderRequest {
            self.requests.lock().unwrap()[i].clone()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            self.requests.lock().unwrap().push(request);
            let mut script = self.script.lock().unwrap();
            assert!(!script.is_empty(), "ScriptedProvider: unexpected extra call");
            script.remove(0)
        }
    }

    /// A provider that never answers.
    struct HangingProvider;

    #[async_trait]
    impl Provider for HangingProvider {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    fn ok(text: &str, model: &str) -> Result<ProviderResponse, ProviderError> {
        Ok(ProviderResponse {
            content: text.into(),
            model: model.into(),
            usage: None,
        })
    }

    fn history() -> Vec<Message> {
        vec![Message::system("rules"), Message::user("Halo")]
    }

    fn gateway(provider: Arc<dyn Provider>) -> CompletionGateway {
        CompletionGateway::new(provider, "mistralai/mistral-small-3.1-24b-instruct:free")
    }

    #[tokio::test]
    async fn primary_success_makes_one_call() {
        let provider = Arc::new(ScriptedProvider::new(vec![ok("Halo", "primary-model")]));
        let outcome = gateway(provider.clone())
            .complete("primary-model", history(), 1024)
            .await;

        assert_eq!(outcome.text, "Halo");
        assert_eq!(
            outcome.source,
            OutcomeSource::Primary {
                model: "primary-model".into()
            }
        );
        assert_eq!(provider.calls(), 1);

        let req = provider.request(0);
        assert_eq!(req.model, "primary-model");
        assert_eq!(req.max_tokens, Some(1024));
        assert_eq!(req.temperature, Some(0.7));
        assert_eq!(req.top_p, Some(0.9));
        assert_eq!(req.response_format, Some(ResponseFormat::Text));
    }

    #[tokio::test]
    async fn primary_failure_uses_fallback_model_and_defaults() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::ApiError {
                status_code: 500,
                message: "boom".into(),
            }),
            ok("Jawaban cadangan", "mistralai/mistral-small-3.1-24b-instruct:free"),
        ]));
        let outcome = gateway(provider.clone())
            .complete("primary-model", history(), 2048)
            .await;

        assert_eq!(outcome.text, "Jawaban cadangan");
        assert!(matches!(outcome.source, OutcomeSource::Fallback { .. }));
        assert_eq!(provider.calls(), 2);

        let fallback = provider.request(1);
        assert_eq!(fallback.model, "mistralai/mistral-small-3.1-24b-instruct:free");
        assert_eq!(fallback.max_tokens, Some(512));
        assert_eq!(fallback.temperature, None);
        assert_eq!(fallback.top_p, None);
        assert_eq!(fallback.response_format, None);
        assert_eq!(fallback.messages, history());
    }

    #[tokio::test]
    async fn empty_primary_choice_triggers_fallback() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::EmptyResponse),
            ok("dari fallback", "fb"),
        ]));
        let outcome = gateway(provider.clone()).complete("p", history(), 512).await;
        assert_eq!(outcome.text, "dari fallback");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn both_failing_returns_apology() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::Network("connection refused".into())),
            Err(ProviderError::Network("connection refused".into())),
        ]));
        let outcome = gateway(provider.clone()).complete("p", history(), 512).await;

        assert_eq!(
            outcome.text,
            "Sistem sedang mengalami gangguan. Silakan coba beberapa saat lagi atau hubungi tim support."
        );
        assert_eq!(outcome.source, OutcomeSource::TotalFailure);
        assert!(!outcome.is_generated());
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn fallback_without_choice_returns_generic_text() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::RateLimited {
                body: String::new(),
            }),
            Err(ProviderError::EmptyResponse),
        ]));
        let outcome = gateway(provider).complete("p", history(), 512).await;
        assert_eq!(outcome.text, FALLBACK_EMPTY_TEXT);
        assert_eq!(outcome.source, OutcomeSource::FallbackEmpty);
    }

    #[tokio::test]
    async fn fallback_rejection_with_json_body_returns_generic_text() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::Network("connection reset".into())),
            Err(ProviderError::RateLimited {
                body: r#"{"error":{"message":"Rate limit exceeded","code":429}}"#.into(),
            }),
        ]));
        let outcome = gateway(provider).complete("p", history(), 512).await;
        assert_eq!(outcome.text, FALLBACK_EMPTY_TEXT);
        assert_eq!(outcome.source, OutcomeSource::FallbackEmpty);
    }

    #[tokio::test]
    async fn fallback_rejection_without_json_returns_apology() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::EmptyResponse),
            Err(ProviderError::ApiError {
                status_code: 502,
                message: "<html>Bad Gateway</html>".into(),
            }),
        ]));
        let outcome = gateway(provider).complete("p", history(), 512).await;
        assert_eq!(outcome.text, APOLOGY_TEXT);
        assert_eq!(outcome.source, OutcomeSource::TotalFailure);
    }

    #[tokio::test]
    async fn timeouts_count_as_failures() {
        let outcome = gateway(Arc::new(HangingProvider))
            .with_timeout(Duration::from_millis(30))
            .complete("p", history(), 512)
            .await;
        assert_eq!(outcome.text, APOLOGY_TEXT);
        assert_eq!(outcome.source, OutcomeSource::TotalFailure);
    }

    #[test]
    fn from_config_reads_model_table() {
        let mut config = fleetwise_config::AppConfig::default();
        config.models.fallback = "openai/gpt-4o-mini".into();
        config.models.fallback_max_tokens = 256;
        let gw = CompletionGateway::from_config(Arc::new(HangingProvider), &config);
        assert_eq!(gw.fallback_model(), "openai/gpt-4o-mini");
        assert_eq!(gw.fallback_max_tokens, 256);
    }
}
