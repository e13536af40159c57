//! Platform-specific directory utilities

use std::path::PathBuf;

/// Get the platform-specific data directory for saves
///
/// Follows platform conventions:
/// - macOS: `~/Library/Application Support/beyonder`
/// - Linux: `~/.local/share/beyonder` (or `$XDG_DATA_HOME/beyonder`)
/// - Windows: `%APPDATA%\beyonder`
/// - Fallback: `./save_data`
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "beyonder")
        .map(|dirs| dirs.data_dir().join("saves"))
        .unwrap_or_else(|| PathBuf::from("./save_data"))
}
