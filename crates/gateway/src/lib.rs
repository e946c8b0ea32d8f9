//! HTTP API gateway for Fleetwise.
//!
//! Exposes the chat endpoint and a health check:
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `GET` | `/health` | Liveness probe |
//! | `POST` | `/api/ai/chat` | One chat turn through the pipeline |
//!
//! Built on Axum. Every route is wrapped in CORS, a 1 MB body limit and
//! HTTP trace logging.

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use fleetwise_agent::{ChatError, ChatPipeline, ChatRequest, EnhancedReply};
use fleetwise_config::{AppConfig, DeploymentMode};

const BODY_LIMIT: usize = 1024 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub pipeline: ChatPipeline,
    pub environment: DeploymentMode,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/ai/chat", post(chat_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors_layer(allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// CORS for the configured origins. `*` allows any origin; entries that are
/// not valid header values are skipped with a warning.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let state = Arc::new(GatewayState {
        pipeline: ChatPipeline::from_config(&config)?,
        environment: config.environment,
    });
    let app = build_router(state, &config.gateway.allowed_origins);

    info!(
        addr = %addr,
        environment = ?config.environment,
        metrics = %config.metrics.base_url,
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Error body. `details` only appears outside production.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// The body is read as raw bytes so that unreadable JSON is reported the same
/// way as a missing message. Context fields of the wrong shape are dropped
/// rather than rejected.
async fn chat_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<EnhancedReply>, ApiError> {
    let request_id = Uuid::new_v4();
    let credential = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());

    info!(
        request_id = %request_id,
        auth = if credential.is_some() { "present" } else { "missing" },
        origin = origin.unwrap_or("-"),
        "AI chat request"
    );

    let body: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(request_id = %request_id, error = %e, "Unreadable chat body");
        error_response(ChatError::Validation, state.environment)
    })?;
    let request = ChatRequest::from_value(body);

    debug!(
        request_id = %request_id,
        message_len = request.message.as_deref().map_or(0, str::len),
        has_context = request.context.is_some(),
        "AI chat body"
    );

    state
        .pipeline
        .respond(request, credential)
        .instrument(info_span!("chat", request_id = %request_id))
        .await
        .map(Json)
        .map_err(|e| error_response(e, state.environment))
}

fn error_response(err: ChatError, environment: DeploymentMode) -> ApiError {
    match err {
        ChatError::Validation => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: err.to_string(),
                details: None,
            }),
        ),
        ChatError::Internal(e) => {
            error!(error = %e, "AI chat failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error".into(),
                    details: (!environment.is_production()).then(|| e.to_string()),
                }),
            )
        }
    }
}
