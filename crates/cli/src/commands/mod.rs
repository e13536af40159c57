//! Subcommand implementations.

mod init;
mod inspect_save;
mod simulate;

pub use init::Init;
pub use inspect_save::InspectSave;
pub use simulate::Simulate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use beyonder_content::{Content, ContentFactory};

use crate::config::CliConfig;
use crate::dirs;

/// Output format
#[derive(Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Summary,
    /// Full JSON output
    Json,
    /// Pretty-printed debug format
    Debug,
}

/// Loads content from `dir`, the configured directory, or the embedded set.
fn load_content(dir: Option<&Path>, config: &CliConfig) -> Result<Content> {
    let factory = match dir.or(config.content_dir.as_deref()) {
        Some(dir) => ContentFactory::from_dir(dir),
        None => ContentFactory::embedded(),
    };
    factory.load().context("Failed to load content")
}

fn resolve_data_dir(dir: Option<PathBuf>, config: &CliConfig) -> PathBuf {
    dir.or_else(|| config.data_dir.clone())
        .unwrap_or_else(dirs::data_dir)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}
