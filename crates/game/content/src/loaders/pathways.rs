//! Pathway progression loader.

use std::path::Path;

use anyhow::Context;
use beyonder_core::{PathwayDefinition, PathwayRegistry, SkillOracle};

use crate::loaders::{LoadResult, read_file};

/// Loader for pathway tables stored as a RON list.
///
/// Every skill a tier row unlocks must already be registered, so pathways
/// are always loaded after the skill catalog.
pub struct PathwayLoader;

impl PathwayLoader {
    pub fn parse(source: &str, skills: &dyn SkillOracle) -> LoadResult<PathwayRegistry> {
        let definitions: Vec<PathwayDefinition> = ron::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse pathway RON: {}", e))?;
        let registry = PathwayRegistry::from_definitions(definitions, skills)
            .context("Failed to register pathways")?;
        Ok(registry)
    }

    pub fn load(path: &Path, skills: &dyn SkillOracle) -> LoadResult<PathwayRegistry> {
        let content = read_file(path)?;
        Self::parse(&content, skills).with_context(|| format!("in {}", path.display()))
    }
}
