//! Runtime implementations of the `beyonder-core` oracle traits.
//!
//! Static content (skills, pathways) is shared immutably through
//! [`OracleBundle`]. World geometry and actor attributes change while the
//! simulation runs, so [`GridWorld`] and [`AttributeTable`] are owned by the
//! simulation worker and mutated only through runtime commands.
mod attributes;
mod world;

use std::sync::Arc;

use beyonder_content::Content;
use beyonder_core::{
    AttributeOracle, GameEnv, PathwayRegistry, PcgRng, ProgressionOracle, RngOracle,
    SkillOracle, SkillRegistry, WorldOracle,
};

pub use attributes::AttributeTable;
pub use world::GridWorld;

/// Immutable content oracles shared by every worker.
#[derive(Clone)]
pub struct OracleBundle {
    skills: Arc<SkillRegistry>,
    pathways: Arc<PathwayRegistry>,
    rng: PcgRng,
}

impl OracleBundle {
    pub fn new(skills: Arc<SkillRegistry>, pathways: Arc<PathwayRegistry>) -> Self {
        Self {
            skills,
            pathways,
            rng: PcgRng, // PcgRng is stateless
        }
    }

    pub fn from_content(content: &Content) -> Self {
        Self::new(
            Arc::new(content.skills.clone()),
            Arc::new(content.pathways.clone()),
        )
    }

    pub fn skills(&self) -> &SkillRegistry {
        &self.skills
    }

    pub fn pathways(&self) -> &PathwayRegistry {
        &self.pathways
    }

    /// Bundles the static oracles with the live world and attributes.
    pub fn game_env<'a>(
        &'a self,
        attributes: &'a dyn AttributeOracle,
        world: &'a dyn WorldOracle,
    ) -> GameEnv<'a> {
        let skills: &'a dyn SkillOracle = self.skills.as_ref();
        let progression: &'a dyn ProgressionOracle = self.pathways.as_ref();
        let rng: &'a dyn RngOracle = &self.rng;
        GameEnv::new(
            Some(skills),
            Some(progression),
            Some(attributes),
            Some(world),
            Some(rng),
        )
    }
}
