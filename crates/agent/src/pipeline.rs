//! One chat turn, end to end.
//!
//! ```text
//! request ─▶ metrics (context or fetch) ─▶ prompt ─▶ messages
//!         ─▶ model + max_tokens ─▶ CompletionGateway ─▶ footers ─▶ insights
//! ```
//!
//! Only a missing message and configuration faults surface as errors.
//! Metrics failures degrade to "no data" and provider failures are absorbed
//! by the gateway into text.

use chrono::{Local, SecondsFormat, Utc};
use fleetwise_core::error::Error;
use fleetwise_core::metrics::MetricsSource;
use fleetwise_core::stats::{BusinessStats, ExtendedAnalytics};
use fleetwise_providers::{CompletionGateway, HttpMetricsSource, OpenAiCompatProvider};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::context::{assemble, compose_system_prompt, token_limit};
use crate::enhancer::enhance;
use crate::insights::{quick_replies, suggested_actions};
use crate::model::ModelSelector;

/// Inbound chat request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,

    /// Replaces the generated system prompt when non-empty.
    #[serde(default)]
    pub system_prompt: Option<String>,

    #[serde(default)]
    pub context: Option<ConversationContext>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Read a request body leniently.
    ///
    /// Only `message` decides whether the request is usable, and that is left
    /// to [`ChatPipeline::respond`]. Any other field of the wrong shape is
    /// treated as absent. A numeric message is taken as its JSON text.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut body) = value else {
            return Self::default();
        };

        let message = match body.remove("message") {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Self {
            message,
            system_prompt: text_field(&mut body, "systemPrompt"),
            context: match body.remove("context") {
                Some(Value::Object(context)) => Some(ConversationContext::from_map(context)),
                _ => None,
            },
        }
    }
}

fn text_field(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Caller-supplied context. Metrics given here are used instead of fetching.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    #[serde(default)]
    pub stats: Option<BusinessStats>,

    #[serde(default)]
    pub extended_stats: Option<ExtendedAnalytics>,

    /// The previous assistant reply, sent ahead of the system prompt.
    #[serde(default)]
    pub last_message: Option<String>,
}

impl ConversationContext {
    fn from_map(mut context: Map<String, Value>) -> Self {
        Self {
            stats: metrics_field(&mut context, "stats"),
            extended_stats: metrics_field(&mut context, "extendedStats"),
            last_message: text_field(&mut context, "lastMessage"),
        }
    }
}

/// A metrics object from the context, or `None` when absent or not an object.
fn metrics_field<T: serde::de::DeserializeOwned>(
    context: &mut Map<String, Value>,
    key: &str,
) -> Option<T> {
    match context.remove(key)? {
        Value::Null => None,
        value @ Value::Object(_) => serde_json::from_value(value)
            .map_err(|e| warn!(field = key, error = %e, "Ignoring malformed context metrics"))
            .ok(),
        _ => {
            warn!(field = key, "Ignoring context metrics that are not an object");
            None
        }
    }
}

/// Final reply plus the extras shown next to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedReply {
    pub response: String,
    pub context: ReplyContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyContext {
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub last_updated: String,
    pub suggested_actions: Vec<String>,
    pub quick_replies: Vec<String>,
}

/// Failures that reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Message is required")]
    Validation,

    #[error(transparent)]
    Internal(#[from] Error),
}

/// The chat orchestration pipeline.
pub struct ChatPipeline {
    gateway: CompletionGateway,
    metrics: Arc<dyn MetricsSource>,
    selector: ModelSelector,
}

impl ChatPipeline {
    pub fn new(
        gateway: CompletionGateway,
        metrics: Arc<dyn MetricsSource>,
        selector: ModelSelector,
    ) -> Self {
        Self {
            gateway,
            metrics,
            selector,
        }
    }

    /// Wire the OpenRouter provider and HTTP metrics source from `config`.
    pub fn from_config(config: &fleetwise_config::AppConfig) -> Result<Self, Error> {
        if !config.has_api_key() {
            warn!("No provider API key configured; completions will fail and degrade to the apology reply");
        }

        let provider = Arc::new(OpenAiCompatProvider::from_config(config)?);
        let metrics = Arc::new(HttpMetricsSource::from_config(config)?);

        Ok(Self::new(
            CompletionGateway::from_config(provider, config),
            metrics,
            ModelSelector::from_config(config),
        ))
    }

    /// Answer one chat request. `credential` is the caller's raw
    /// `Authorization` header, forwarded only to the metrics source.
    pub async fn respond(
        &self,
        request: ChatRequest,
        credential: Option<&str>,
    ) -> Result<EnhancedReply, ChatError> {
        let ChatRequest {
            message,
            system_prompt,
            context,
        } = request;

        let message = message
            .filter(|m| !m.is_empty())
            .ok_or(ChatError::Validation)?;
        let context = context.unwrap_or_default();
        let model = self.selector.select()?;

        let (stats, analytics) = tokio::join!(
            self.resolve_stats(context.stats, credential),
            self.resolve_analytics(context.extended_stats, credential),
        );

        let prompt = match system_prompt.filter(|p| !p.is_empty()) {
            Some(custom) => custom,
            None => compose_system_prompt(
                stats.as_ref(),
                analytics.as_ref(),
                Local::now().date_naive(),
            ),
        };

        let messages = assemble(&prompt, &message, context.last_message.as_deref());
        let max_tokens = token_limit(&message);

        debug!(
            model = %model,
            max_tokens,
            messages = messages.len(),
            has_stats = stats.is_some(),
            has_analytics = analytics.is_some(),
            "Prepared chat request"
        );

        let outcome = self.gateway.complete(model, messages, max_tokens).await;
        info!(source = ?outcome.source, "Chat completion finished");

        let response = enhance(&outcome.text, stats.as_ref(), analytics.as_ref());

        Ok(EnhancedReply {
            context: ReplyContext {
                last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                suggested_actions: suggested_actions(&response),
                quick_replies: quick_replies(&response),
            },
            response,
        })
    }

    async fn resolve_stats(
        &self,
        supplied: Option<BusinessStats>,
        credential: Option<&str>,
    ) -> Option<BusinessStats> {
        if supplied.is_some() {
            return supplied;
        }
        match self.metrics.business_stats(credential).await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!(error = %e, "Failed to fetch business stats");
                None
            }
        }
    }

    async fn resolve_analytics(
        &self,
        supplied: Option<ExtendedAnalytics>,
        credential: Option<&str>,
    ) -> Option<ExtendedAnalytics> {
        if supplied.is_some() {
            return supplied;
        }
        match self.metrics.extended_analytics(credential).await {
            Ok(analytics) => Some(analytics),
            Err(e) => {
                warn!(error = %e, "Failed to fetch analytics");
                None
            }
        }
    }
}
