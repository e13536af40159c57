//! CLI configuration read from the environment.
use std::env;
use std::path::PathBuf;

/// Settings shared by every subcommand.
///
/// Command-line flags take precedence over these.
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    /// Directory holding actor saves.
    pub data_dir: Option<PathBuf>,
    /// Directory with `skills.ron`, `pathways.ron` and `config.toml`.
    pub content_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BEYONDER_DATA_DIR` - Directory for actor saves (default: platform-specific)
    /// - `BEYONDER_CONTENT_DIR` - Content directory (default: embedded content)
    /// - `BEYONDER_LOG_FILE` - Also write logs to this file
    pub fn from_env() -> Self {
        Self {
            data_dir: read_env("BEYONDER_DATA_DIR"),
            content_dir: read_env("BEYONDER_CONTENT_DIR"),
            log_file: read_env("BEYONDER_LOG_FILE"),
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
