//! Command-line driver for the Beyonder ability simulation.
//!
//! Run with: `cargo run -p beyonder-cli -- <command>`

mod commands;
mod config;
mod dirs;
mod logging;

use anyhow::Result;
use clap::Parser;
use commands::{Init, InspectSave, Simulate};

use crate::config::CliConfig;

/// Beyonder ability simulation tools
#[derive(Parser)]
#[command(name = "beyonder")]
#[command(about = "Drive and inspect the Beyonder ability simulation", long_about = None)]
#[command(version)]
struct Cli {
    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run a scripted scene and report what happened
    Simulate(Simulate),

    /// Make an actor a Beyonder and write its save
    Init(Init),

    /// Read and inspect an actor save
    InspectSave(InspectSave),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = CliConfig::from_env();

    let log_file = cli.log_file.clone().or_else(|| config.log_file.clone());
    let _guard = logging::setup_logging(log_file.as_deref())?;

    match cli.command {
        Command::Simulate(cmd) => cmd.execute(&config).await,
        Command::Init(cmd) => cmd.execute(&config).await,
        Command::InspectSave(cmd) => cmd.execute(&config),
    }
}
