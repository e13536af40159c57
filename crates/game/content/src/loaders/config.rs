//! Game configuration loader.

use std::path::Path;

use beyonder_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
///
/// Keys missing from the file keep their [`GameConfig::default`] value.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn parse(source: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        Ok(config)
    }

    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beyonder_core::ScanStrategyKind;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ConfigLoader::parse("scan_strategy = \"shell\"\nheartbeat_interval = 40\n")
            .unwrap();
        assert_eq!(config.scan_strategy, ScanStrategyKind::Shell);
        assert_eq!(config.heartbeat_interval, 40);
        assert_eq!(config.divination_interval, GameConfig::default().divination_interval);
    }

    #[test]
    fn unknown_strategy_is_an_error() {
        assert!(ConfigLoader::parse("scan_strategy = \"spiral\"").is_err());
    }
}
