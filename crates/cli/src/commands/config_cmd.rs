//! `fleetwise config`: Configuration management commands.

use fleetwise_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();

            if !config.has_api_key() {
                warnings.push("No API key set (set FLEETWISE_API_KEY or OPENROUTER_API_KEY env var)");
            }

            if config.models.candidates.contains(&config.models.fallback) {
                warnings.push("Fallback model also appears in the primary candidate table");
            }

            if config.gateway.allowed_origins.iter().any(|o| o == "*") {
                warnings.push("CORS allows any origin");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Environment: {:?}", config.environment);
            println!("   Provider:    {}", config.provider.base_url);
            println!(
                "   Model:       {}",
                config.models.candidates.first().map_or("-", String::as_str)
            );
            println!("   Fallback:    {}", config.models.fallback);
            println!("   Metrics:     {}", config.metrics.base_url);
            println!(
                "   Gateway:     {}:{}",
                config.gateway.host, config.gateway.port
            );
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    println!("{}", render_redacted(&config)?);
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

/// TOML rendering of `config` with the API key masked.
fn render_redacted(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.api_key.is_some() {
        shown.api_key = Some("[REDACTED]".into());
    }
    toml::to_string_pretty(&shown)
}
