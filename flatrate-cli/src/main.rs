//! Flatrate CLI - Command-line interface
//!
//! Serves the streaming availability API or runs single searches from the
//! shell.

mod commands;
mod tracing_setup;

use clap::Parser;
use flatrate_search::SourceConfig;

use crate::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "flatrate")]
#[command(about = "Find which streaming services carry a title at flat rate")]
#[command(version)]
struct Cli {
    /// Console log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: CliLogLevel,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level());

    let config = SourceConfig::from_env();
    tracing::debug!(?config, "Loaded source configuration");

    commands::handle_command(cli.command, config).await
}
