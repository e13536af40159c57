//! Detection versus concealment.
//!
//! The contest is a deterministic threshold: no rolls, so the same stats
//! always give the same answer.

use crate::config::GameConfig;
use crate::env::{AttributeOracle, GameEnv, OracleError, ProgressionOracle, SkillOracle};
use crate::skill::SkillTags;
use crate::state::ActorState;

/// True when `detection + sight_bonus` meets `concealment`.
/// Targets with no concealment are always perceived.
pub fn can_perceive(detection: f64, concealment: f64, sight_bonus: f64) -> bool {
    if concealment <= 0.0 {
        return true;
    }
    detection + sight_bonus >= concealment
}

/// Rank-scaled bonus granted while any `ENHANCED_SIGHT` skill is active.
pub fn sight_bonus<S: SkillOracle + ?Sized>(
    actor: &ActorState,
    skills: &S,
    config: &GameConfig,
) -> f64 {
    let enhanced = actor.ability.active_skills().any(|id| {
        skills
            .definition(id)
            .is_some_and(|def| def.tags.contains(SkillTags::ENHANCED_SIGHT))
    });
    if enhanced {
        actor.tier().rank() as f64 * config.sight_bonus_per_rank
    } else {
        0.0
    }
}

/// Computes effective perception stats from attributes and pathway bonuses.
#[derive(Clone, Copy)]
pub struct PerceptionEvaluator<'a> {
    skills: &'a dyn SkillOracle,
    progression: &'a dyn ProgressionOracle,
    attributes: &'a dyn AttributeOracle,
    config: &'a GameConfig,
}

impl<'a> PerceptionEvaluator<'a> {
    pub fn new(
        skills: &'a dyn SkillOracle,
        progression: &'a dyn ProgressionOracle,
        attributes: &'a dyn AttributeOracle,
        config: &'a GameConfig,
    ) -> Self {
        Self {
            skills,
            progression,
            attributes,
            config,
        }
    }

    pub fn from_env(env: &GameEnv<'a>, config: &'a GameConfig) -> Result<Self, OracleError> {
        Ok(Self::new(
            env.skills()?,
            env.progression()?,
            env.attributes()?,
            config,
        ))
    }

    /// Base detection plus the pathway bonus for the actor's tier.
    pub fn detection(&self, actor: &ActorState) -> f64 {
        let bonus = actor
            .resource
            .pathway()
            .map_or(0.0, |p| self.progression.detection_bonus(p, actor.tier()));
        self.attributes.detection(actor.id) + bonus
    }

    pub fn concealment(&self, actor: &ActorState) -> f64 {
        let bonus = actor
            .resource
            .pathway()
            .map_or(0.0, |p| self.progression.concealment_bonus(p, actor.tier()));
        self.attributes.concealment(actor.id) + bonus
    }

    pub fn sight_bonus(&self, actor: &ActorState) -> f64 {
        sight_bonus(actor, self.skills, self.config)
    }

    /// Detection including the active sight bonus.
    pub fn effective_detection(&self, actor: &ActorState) -> f64 {
        self.detection(actor) + self.sight_bonus(actor)
    }

    pub fn can_perceive(&self, observer: &ActorState, target: &ActorState) -> bool {
        can_perceive(
            self.detection(observer),
            self.concealment(target),
            self.sight_bonus(observer),
        )
    }
}
