//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// TextGuard - quota-aware spam analysis backed by an LLM service
#[derive(Parser, Debug)]
#[command(name = "textguard")]
#[command(about = "Quota-aware spam analysis backed by an LLM service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file layered over the defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a single text
    Analyze {
        /// Text to analyze
        text: String,

        /// Caller API key
        #[arg(long, env = "TEXTGUARD_API_KEY", hide_env_values = true)]
        key: String,

        /// Model override
        #[arg(long)]
        model: Option<String>,

        /// Sampling temperature override
        #[arg(long)]
        temperature: Option<f32>,
    },

    /// Analyze every line of a file as one batch
    Batch {
        /// File with one text per line
        file: PathBuf,

        /// Caller API key
        #[arg(long, env = "TEXTGUARD_API_KEY", hide_env_values = true)]
        key: String,

        /// Cancel unfinished items after this many seconds
        #[arg(long)]
        deadline_secs: Option<u64>,
    },

    /// Show quota and cache usage for a key
    Usage {
        /// Caller API key
        #[arg(long, env = "TEXTGUARD_API_KEY", hide_env_values = true)]
        key: String,
    },

    /// List configured tiers
    Tiers,
}
