//! Content loaders for reading game data from files.
//!
//! Every loader has a `parse` entry point for in-memory text (used for the
//! embedded defaults) and a `load` entry point for files on disk.

pub mod config;
pub mod factory;
pub mod pathways;
pub mod skills;

pub use config::ConfigLoader;
pub use factory::{Content, ContentFactory};
pub use pathways::PathwayLoader;
pub use skills::SkillLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
