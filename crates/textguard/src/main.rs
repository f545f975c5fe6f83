//! TextGuard CLI binary.
//!
//! This binary provides command-line access to TextGuard:
//! - Analyze a single text
//! - Analyze a file of texts as one batch
//! - Inspect quota usage and configured tiers

use clap::Parser;
use std::time::Duration;
use textguard::{AnalysisOptions, TextGuard, TextGuardConfig};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use cli::{Cli, Commands};

    // Load .env before reading any credentials
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    textguard_core::init_tracing(log_level, cli.json_logs)?;

    let config = TextGuardConfig::load_with(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            text,
            key,
            model,
            temperature,
        } => {
            let mut options = AnalysisOptions::builder();
            if let Some(model) = model {
                options.model(model);
            }
            if let Some(temperature) = temperature {
                options.temperature(temperature);
            }
            let guard = TextGuard::connect(&config)?;
            cli::analyze(&guard, &key, &text, &options.build()?).await?;
        }

        Commands::Batch {
            file,
            key,
            deadline_secs,
        } => {
            let guard = TextGuard::connect(&config)?;
            cli::batch(&guard, &key, &file, deadline_secs.map(Duration::from_secs)).await?;
        }

        Commands::Usage { key } => {
            let guard = TextGuard::connect(&config)?;
            cli::usage(&guard, &key)?;
        }

        Commands::Tiers => {
            cli::list_tiers(&config)?;
        }
    }

    Ok(())
}
