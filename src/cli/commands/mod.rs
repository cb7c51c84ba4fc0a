//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod discover;
mod extract;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::config::Settings;
use crate::pipeline::DealPolicy;

use self::extract::ExtractionMode;

#[derive(Parser)]
#[command(name = "dealscout")]
#[command(about = "Find sale pages on storefronts and extract discounted products")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ./dealscout.toml when present)
    #[arg(short, long, global = true, env = "DEALSCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Options shared by both extraction commands.
#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Page cap, or a single product URL to process instead of the
    /// discovery artifact
    #[arg(env = "MAX_URLS")]
    pub scope: Option<String>,

    /// Deal policy (overrides the config file)
    #[arg(long, value_enum)]
    pub policy: Option<DealPolicy>,

    /// Discovery artifact to read candidates from
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Deals artifact to write
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover candidate sale pages on a storefront
    Discover {
        /// Storefront domain or base URL (e.g. www.nike.com)
        domain: String,

        /// Discovery artifact to write
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Extract deals from candidate pages over plain HTTP
    Extract(ExtractArgs),

    /// Extract deals from candidate pages rendered in a headless browser
    Render(ExtractArgs),
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Discover { domain, out } => discover::cmd_discover(&settings, &domain, out).await,
        Commands::Extract(args) => {
            extract::cmd_extract(&settings, ExtractionMode::Http, args).await
        }
        Commands::Render(args) => {
            extract::cmd_extract(&settings, ExtractionMode::Rendered, args).await
        }
    }
}
