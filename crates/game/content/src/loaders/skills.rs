//! Skill catalog loader.

use std::path::Path;

use anyhow::Context;
use beyonder_core::{SkillDefinition, SkillRegistry};

use crate::loaders::{LoadResult, read_file};

/// Loader for skill definitions stored as a RON list.
///
/// ```ron
/// [
///     (
///         id: "seer:mind_read",
///         cast_type: Instant,
///         cost: (base: 10.0),
///         cooldown: (base_ticks: 60),
///     ),
/// ]
/// ```
pub struct SkillLoader;

impl SkillLoader {
    /// Parses the catalog and registers every definition.
    ///
    /// A duplicate id fails the whole load.
    pub fn parse(source: &str) -> LoadResult<SkillRegistry> {
        let definitions: Vec<SkillDefinition> = ron::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse skill catalog RON: {}", e))?;
        let registry = SkillRegistry::from_definitions(definitions)
            .context("Failed to register skill catalog")?;
        Ok(registry)
    }

    pub fn load(path: &Path) -> LoadResult<SkillRegistry> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beyonder_core::{CastType, SkillId, SkillOracle, SkillTags, Tier};

    #[test]
    fn parses_payload_cast_types_and_tags() {
        let registry = SkillLoader::parse(
            r#"[
                (
                    id: "test:bolt",
                    cast_type: Charging(max_charge_ticks: 30),
                    cost: (base: 5.0, per_rank: 1.5),
                    effect: Some("bolt"),
                    tags: "HOSTILE | DIVINATION",
                ),
                (id: "test:aura", cast_type: Passive, cost: (base: 0.0)),
            ]"#,
        )
        .unwrap();

        let bolt = registry
            .definition(&SkillId::new("test:bolt").unwrap())
            .unwrap();
        assert_eq!(
            bolt.cast_type,
            CastType::Charging {
                max_charge_ticks: 30
            }
        );
        assert_eq!(bolt.cost_at(Tier::new(7).unwrap()), 8.0);
        assert_eq!(bolt.tags, SkillTags::HOSTILE | SkillTags::DIVINATION);
        assert_eq!(bolt.cooldown_ticks(Tier::WEAKEST), 0);

        let aura = registry
            .definition(&SkillId::new("test:aura").unwrap())
            .unwrap();
        assert!(aura.tags.is_empty());
        assert_eq!(aura.effect, None);
    }

    #[test]
    fn duplicate_ids_fail() {
        let err = SkillLoader::parse(
            r#"[
                (id: "test:a", cast_type: Instant, cost: (base: 1.0)),
                (id: "test:a", cast_type: Passive, cost: (base: 0.0)),
            ]"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("test:a"));
    }

    #[test]
    fn malformed_ids_are_rejected() {
        assert!(SkillLoader::parse(r#"[(id: "No Namespace", cast_type: Instant, cost: (base: 1.0))]"#).is_err());
    }
}
