//! # Media Relay CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration loading and validation
//! - `get` / `search` streams into a framed file or the log
//! - Operation timer summary once a stream terminates

mod cli;
mod commands;
mod error;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_get, run_search, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    observability::init_with_config(&cli.observability_config())?;

    info!(version = env!("CARGO_PKG_VERSION"), "Media relay starting");

    let result = match &cli.command {
        Commands::Get(args) => run_get(args).await,
        Commands::Search(args) => run_search(args).await,
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}
