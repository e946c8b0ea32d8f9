//! `fleetwise ask`: One chat turn from the command line.

use fleetwise_agent::{ChatPipeline, ChatRequest, ConversationContext};
use fleetwise_config::AppConfig;
use tracing::debug;

pub async fn run(
    message: String,
    system_prompt: Option<String>,
    last_message: Option<String>,
    auth: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  WARNING: No API key configured; the reply will be the outage apology.");
        eprintln!("  Set FLEETWISE_API_KEY or OPENROUTER_API_KEY, or add api_key to:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
    }

    let pipeline = ChatPipeline::from_config(&config)?;

    let request = ChatRequest {
        message: Some(message),
        system_prompt,
        context: last_message.map(|m| ConversationContext {
            last_message: Some(m),
            ..Default::default()
        }),
    };

    debug!(
        has_auth = auth.is_some(),
        has_last_message = request.context.is_some(),
        "Running one-shot chat"
    );

    let reply = pipeline.respond(request, auth.as_deref()).await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);

    Ok(())
}
