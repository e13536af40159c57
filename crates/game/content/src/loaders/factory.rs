//! Content factory for building the static tables from data files.

use std::path::{Path, PathBuf};

use beyonder_core::{GameConfig, PathwayRegistry, SkillRegistry};

use crate::loaders::{ConfigLoader, LoadResult, PathwayLoader, SkillLoader};

const EMBEDDED_SKILLS: &str = include_str!("../../data/skills.ron");
const EMBEDDED_PATHWAYS: &str = include_str!("../../data/pathways.ron");
const EMBEDDED_CONFIG: &str = include_str!("../../data/config.toml");

/// Fully validated static content, ready to back the runtime oracles.
#[derive(Clone, Debug)]
pub struct Content {
    pub skills: SkillRegistry,
    pub pathways: PathwayRegistry,
    pub config: GameConfig,
}

#[derive(Clone, Debug)]
enum Source {
    Embedded,
    Dir(PathBuf),
}

/// Content factory that loads game content from the bundled defaults or a
/// data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml     (optional, defaults when absent)
/// ├── skills.ron
/// └── pathways.ron
/// ```
#[derive(Clone, Debug)]
pub struct ContentFactory {
    source: Source,
}

impl ContentFactory {
    /// Factory over the content compiled into this crate.
    pub fn embedded() -> Self {
        Self {
            source: Source::Embedded,
        }
    }

    /// Factory over a data directory on disk.
    pub fn from_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::Dir(data_dir.into()),
        }
    }

    /// Returns the data directory path, or `None` for embedded content.
    pub fn data_dir(&self) -> Option<&Path> {
        match &self.source {
            Source::Embedded => None,
            Source::Dir(dir) => Some(dir),
        }
    }

    /// Loads the skill catalog from `skills.ron`.
    pub fn load_skills(&self) -> LoadResult<SkillRegistry> {
        match &self.source {
            Source::Embedded => SkillLoader::parse(EMBEDDED_SKILLS),
            Source::Dir(dir) => SkillLoader::load(&dir.join("skills.ron")),
        }
    }

    /// Loads pathway tables from `pathways.ron`, validated against `skills`.
    pub fn load_pathways(&self, skills: &SkillRegistry) -> LoadResult<PathwayRegistry> {
        match &self.source {
            Source::Embedded => PathwayLoader::parse(EMBEDDED_PATHWAYS, skills),
            Source::Dir(dir) => PathwayLoader::load(&dir.join("pathways.ron"), skills),
        }
    }

    /// Loads game configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        match &self.source {
            Source::Embedded => ConfigLoader::parse(EMBEDDED_CONFIG),
            Source::Dir(dir) => {
                let path = dir.join("config.toml");
                if path.exists() {
                    ConfigLoader::load(&path)
                } else {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    Ok(GameConfig::default())
                }
            }
        }
    }

    /// Loads and cross-validates everything.
    pub fn load(&self) -> LoadResult<Content> {
        let skills = self.load_skills()?;
        let pathways = self.load_pathways(&skills)?;
        let config = self.load_config()?;
        tracing::info!(
            skills = skills.len(),
            pathways = pathways.len(),
            source = ?self.data_dir(),
            "content loaded"
        );
        Ok(Content {
            skills,
            pathways,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beyonder_core::{PathwayId, ProgressionOracle, SkillId, SkillOracle, SkillTags, Tier};

    #[test]
    fn embedded_content_is_consistent() {
        let content = ContentFactory::embedded().load().unwrap();
        assert_eq!(content.config, GameConfig::default());

        let seer = PathwayId::new("lotm:seer").unwrap();
        let pathway = content.pathways.pathway(&seer).unwrap();
        let unlocked = pathway.skills_unlocked_at(Tier::new(7).unwrap());
        assert_eq!(unlocked.len(), 6);
        assert!(unlocked.contains(&SkillId::new("seer:divination").unwrap()));
        assert_eq!(
            content.pathways.spirituality_bonus(&seer, Tier::new(8).unwrap()),
            80.0
        );

        let divination = content
            .skills
            .definition(&SkillId::new("seer:divination").unwrap())
            .unwrap();
        assert!(divination.tags.contains(SkillTags::DIVINATION));
    }

    #[test]
    fn directory_without_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("skills.ron"),
            r#"[(id: "test:look", cast_type: Instant, cost: (base: 1.0))]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("pathways.ron"),
            r#"[(id: "test:watcher", tiers: [(tier: 9, skills: ["test:look"])])]"#,
        )
        .unwrap();

        let factory = ContentFactory::from_dir(dir.path());
        assert_eq!(factory.data_dir(), Some(dir.path()));
        let content = factory.load().unwrap();
        assert_eq!(content.skills.len(), 1);
        assert_eq!(content.pathways.len(), 1);
        assert_eq!(content.config, GameConfig::default());
    }

    #[test]
    fn missing_catalog_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContentFactory::from_dir(dir.path()).load().unwrap_err();
        assert!(err.to_string().contains("skills.ron"));
    }
}
