//! Configuration loading, validation, and management for Fleetwise.
//!
//! Loads configuration from `~/.fleetwise/config.toml` with environment
//! variable overrides. Validates all settings at startup. The resulting
//! [`AppConfig`] is immutable and handed to the pipeline explicitly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.fleetwise/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion provider credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Deployment mode; controls how much error detail is exposed
    #[serde(default)]
    pub environment: DeploymentMode,

    /// Completion provider endpoint and attribution headers
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Model candidate table and fallback model
    #[serde(default)]
    pub models: ModelsConfig,

    /// Admin backend serving business metrics
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// HTTP gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("environment", &self.environment)
            .field("provider", &self.provider)
            .field("models", &self.models)
            .field("metrics", &self.metrics)
            .field("gateway", &self.gateway)
            .finish()
    }
}

/// Where the process is deployed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    Development,
    #[default]
    Production,
}

impl DeploymentMode {
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

impl std::str::FromStr for DeploymentMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::ValidationError(format!(
                "unknown environment '{other}' (expected development or production)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_url")]
    pub base_url: String,

    /// Sent as `HTTP-Referer`
    #[serde(default = "default_referer")]
    pub referer: String,

    /// Sent as `X-Title`
    #[serde(default = "default_title")]
    pub title: String,

    /// Upper bound for one completion attempt
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

fn default_provider_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_referer() -> String {
    "https://your-rental-app.com".into()
}
fn default_title() -> String {
    "Rental Mobil AI Assistant".into()
}
fn default_provider_timeout() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            referer: default_referer(),
            title: default_title(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

/// The static model table.
///
/// `candidates` is an ordered preference list and only its first entry is
/// ever used. `fallback` is a separate identifier and need not appear in
/// `candidates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,

    #[serde(default = "default_fallback_model")]
    pub fallback: String,

    #[serde(default = "default_fallback_max_tokens")]
    pub fallback_max_tokens: u32,
}

fn default_candidates() -> Vec<String> {
    vec![
        "mistralai/mixtral-8x7b-instruct:nitro".into(),
        "anthropic/claude-3-opus".into(),
        "anthropic/claude-3-sonnet".into(),
        "openai/gpt-4-turbo-preview".into(),
        "mistralai/mistral-small-3.1-24b-instruct:free".into(),
    ]
}
fn default_fallback_model() -> String {
    "mistralai/mistral-small-3.1-24b-instruct:free".into()
}
fn default_fallback_max_tokens() -> u32 {
    512
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            fallback: default_fallback_model(),
            fallback_max_tokens: default_fallback_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Base URL of the admin API; `/users/admin/stats` and
    /// `/users/admin/analytics` are appended
    #[serde(default = "default_metrics_url")]
    pub base_url: String,

    #[serde(default = "default_metrics_timeout")]
    pub timeout_secs: u64,
}

fn default_metrics_url() -> String {
    "http://localhost:3000/api".into()
}
fn default_metrics_timeout() -> u64 {
    10
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            base_url: default_metrics_url(),
            timeout_secs: default_metrics_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Origins allowed by CORS. Empty = same-origin only.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_port() -> u16 {
    5050
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".into()]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.fleetwise/config.toml).
    ///
    /// Environment variables override the file:
    /// - `FLEETWISE_API_KEY`, then `OPENROUTER_API_KEY` (only when the file has no key)
    /// - `FLEETWISE_ENV`
    /// - `FLEETWISE_METRICS_URL`
    /// - `FLEETWISE_MODEL` (becomes the first candidate)
    /// - `FLEETWISE_PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (usually `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.api_key.is_none() {
            self.api_key = non_empty("FLEETWISE_API_KEY").or_else(|| non_empty("OPENROUTER_API_KEY"));
        }

        if let Some(env) = non_empty("FLEETWISE_ENV") {
            self.environment = env.parse()?;
        }

        if let Some(url) = non_empty("FLEETWISE_METRICS_URL") {
            self.metrics.base_url = url;
        }

        if let Some(model) = non_empty("FLEETWISE_MODEL") {
            self.models.candidates.retain(|m| *m != model);
            self.models.candidates.insert(0, model);
        }

        if let Some(port) = non_empty("FLEETWISE_PORT") {
            self.gateway.port = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("FLEETWISE_PORT is not a valid port: {port}"))
            })?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".fleetwise")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.models.candidates.iter().all(|m| m.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "models.candidates must list at least one model".into(),
            ));
        }

        if self.models.fallback.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "models.fallback must not be empty".into(),
            ));
        }

        if self.models.fallback_max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "models.fallback_max_tokens must be > 0".into(),
            ));
        }

        if self.provider.timeout_secs == 0 || self.metrics.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeouts must be at least one second".into(),
            ));
        }

        Ok(())
    }

    /// Check if a provider credential is available.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            environment: DeploymentMode::default(),
            provider: ProviderConfig::default(),
            models: ModelsConfig::default(),
            metrics: MetricsConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
