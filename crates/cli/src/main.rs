//! Fleetwise CLI entry point.
//!
//! Commands:
//! - `serve`    Start the HTTP chat API
//! - `ask`      Run one message through the pipeline and print the reply
//! - `onboard`  Write a default config file
//! - `config`   Show, validate, or locate the configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "fleetwise",
    about = "Fleetwise: AI business assistant for rental-fleet operators",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP chat API
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question and print the enhanced reply as JSON
    Ask {
        /// The question
        #[arg(short, long)]
        message: String,

        /// Use this system prompt instead of the generated one
        #[arg(long)]
        system_prompt: Option<String>,

        /// Previous assistant reply to continue from
        #[arg(long)]
        last_message: Option<String>,

        /// Authorization header value forwarded to the metrics backend
        #[arg(long, env = "FLEETWISE_METRICS_AUTH")]
        auth: Option<String>,
    },

    /// Write a default configuration file
    Onboard,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration (secrets redacted)
    Show,
    /// Load and validate the configuration
    Validate,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    if cli.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ask {
            message,
            system_prompt,
            last_message,
            auth,
        } => commands::ask::run(message, system_prompt, last_message, auth).await?,
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Validate => commands::config_cmd::validate().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
    }

    Ok(())
}
