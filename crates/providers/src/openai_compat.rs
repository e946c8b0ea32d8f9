//! OpenAI-compatible provider implementation.
//!
//! Speaks the `/chat/completions` protocol used by OpenRouter, OpenAI and most
//! hosted model gateways. OpenRouter additionally reads the `HTTP-Referer`
//! and `X-Title` attribution headers, which are sent when configured.

use async_trait::async_trait;
use fleetwise_core::error::ProviderError;
use fleetwise_core::provider::*;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// An OpenAI-compatible LLM provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    referer: Option<String>,
    title: Option<String>,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    ///
    /// The key is trimmed; pasted credentials often carry a trailing newline.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into().trim().to_string(),
            referer: None,
            title: None,
            client,
        })
    }

    /// Create a provider from the application configuration.
    pub fn from_config(config: &fleetwise_config::AppConfig) -> Result<Self, ProviderError> {
        let provider = Self::new(
            "openrouter",
            &config.provider.base_url,
            config.api_key.clone().unwrap_or_default(),
            Duration::from_secs(config.provider.timeout_secs),
        )?;
        Ok(provider.with_attribution(&config.provider.referer, &config.provider.title))
    }

    /// Set the `HTTP-Referer` / `X-Title` headers. Blank values are not sent.
    pub fn with_attribution(mut self, referer: &str, title: &str) -> Self {
        self.referer = Some(referer.to_string()).filter(|s| !s.trim().is_empty());
        self.title = Some(title.to_string()).filter(|s| !s.trim().is_empty());
        self
    }

    fn map_send_error(e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(e.to_string())
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            max_tokens = ?request.max_tokens,
            "Sending completion request"
        );

        let mut builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");

        if let Some(referer) = &self.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            builder = builder.header("X-Title", title);
        }

        let response = builder
            .json(&request)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Provider returned error");
            return Err(match status.as_u16() {
                429 => ProviderError::RateLimited { body },
                code @ (401 | 403) => ProviderError::AuthenticationFailed {
                    status_code: code,
                    body,
                },
                code => ProviderError::ApiError {
                    status_code: code,
                    message: body,
                },
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty())
            .ok_or(ProviderError::EmptyResponse)?;

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ProviderResponse {
            content,
            model: api_response.model.unwrap_or(request.model),
            usage,
        })
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(Self::map_send_error)?;

        Ok(response.status().is_success())
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    #[serde(default)]
    message: Option<ApiMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
