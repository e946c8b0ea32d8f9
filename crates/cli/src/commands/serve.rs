//! `fleetwise serve`: Start the HTTP chat API.

use fleetwise_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🚗 Fleetwise Gateway");
    println!("   Listening:   {}:{}", config.gateway.host, config.gateway.port);
    println!("   Chat:        POST /api/ai/chat");
    println!("   Metrics:     {}", config.metrics.base_url);
    println!("   Environment: {:?}", config.environment);

    fleetwise_gateway::start(config).await?;

    Ok(())
}
