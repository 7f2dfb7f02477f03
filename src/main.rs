//! chatclone - terminal chat client
//!
#![doc = "chatclone - terminal chat client"]
#![doc = "Main entry point for the chatclone application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatclone::cli::{Cli, Commands, KeyCommand};
use chatclone::commands;
use chatclone::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { model } => {
            if let Some(m) = &model {
                tracing::debug!("Using model override: {}", m);
            }
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Key { command } => match command {
            KeyCommand::Set { value } => {
                commands::key::set_key(&config, &value)?;
                Ok(())
            }
            KeyCommand::Status => {
                commands::key::key_status(&config)?;
                Ok(())
            }
        },
        Commands::Models => {
            commands::models::list_models(&config);
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they do not interleave with the chat transcript.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "chatclone=debug"
    } else {
        "chatclone=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
