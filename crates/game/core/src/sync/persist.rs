//! Versioned save schema for one actor.
//!
//! Ids are stored as raw strings so a save written against a different
//! skill table still loads: every entry that no longer parses or resolves
//! is dropped on its own and counted in the [`LoadReport`].

use crate::divination::DivinationQuery;
use crate::env::{ProgressionOracle, SkillOracle};
use crate::error::{ErrorSeverity, GameError};
use crate::state::{ActorFlags, ActorId, ActorState, PathwayId, SkillId, Tier};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PersistError {
    #[error("save schema version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

impl GameError for PersistError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedVersion { .. } => "PERSIST_UNSUPPORTED_VERSION",
        }
    }
}

/// Counts of entries dropped while restoring a save.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadReport {
    pub learned: usize,
    pub cooldowns: usize,
    pub active: usize,
    pub presets: usize,
    /// Page, pathway, tier or resource fields that were reset.
    pub fields: usize,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.learned + self.cooldowns + self.active + self.presets + self.fields
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersistedActor {
    pub version: u32,
    pub actor: u32,
    pub flags: u8,
    pub learned: Vec<String>,
    pub cooldowns: Vec<(String, u32)>,
    pub active: Vec<String>,
    /// `(page, slot, skill)` for every bound slot.
    pub presets: Vec<(u32, u32, String)>,
    pub active_page: u32,
    pub current: f64,
    pub combat_timer: u32,
    pub pathway: Option<String>,
    pub tier: u8,
    pub mastery: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub query: Option<DivinationQuery>,
}

impl PersistedActor {
    pub const VERSION: u32 = 1;

    pub fn capture(actor: &ActorState) -> Self {
        let ability = &actor.ability;
        let mut presets = Vec::new();
        for (page, slots) in ability.presets().iter().enumerate() {
            for (slot, id) in slots.iter().enumerate() {
                if let Some(id) = id {
                    presets.push((page as u32, slot as u32, id.to_string()));
                }
            }
        }
        Self {
            version: Self::VERSION,
            actor: actor.id.0,
            flags: actor.flags.bits(),
            learned: ability.learned().map(ToString::to_string).collect(),
            cooldowns: ability
                .cooldowns()
                .map(|(id, ticks)| (id.to_string(), ticks))
                .collect(),
            active: ability.active_skills().map(ToString::to_string).collect(),
            presets,
            active_page: ability.active_page() as u32,
            current: actor.resource.current(),
            combat_timer: actor.resource.combat_timer(),
            pathway: actor.resource.pathway().map(ToString::to_string),
            tier: actor.tier().value(),
            mastery: actor.mastery(),
            query: actor.carrier.query().cloned(),
        }
    }

    /// Rebuilds the actor. Only an unknown schema version is an error.
    pub fn restore(
        &self,
        skills: &dyn SkillOracle,
        progression: &dyn ProgressionOracle,
    ) -> Result<(ActorState, LoadReport), PersistError> {
        if self.version != Self::VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }

        let mut report = LoadReport::default();
        let mut actor = ActorState::new(ActorId(self.actor))
            .with_flags(ActorFlags::from_bits_truncate(self.flags));
        let known = |raw: &str| SkillId::new(raw).ok().filter(|id| skills.contains(id));

        for raw in &self.learned {
            match known(raw) {
                Some(id) => {
                    actor.ability.insert_learned(id, skills);
                }
                None => report.learned += 1,
            }
        }
        for (raw, ticks) in &self.cooldowns {
            match known(raw) {
                Some(id) => actor.ability.set_cooldown(id, *ticks),
                None => report.cooldowns += 1,
            }
        }
        for raw in &self.active {
            let restored = known(raw).is_some_and(|id| actor.ability.activate(id).is_ok());
            if !restored {
                report.active += 1;
            }
        }
        for (page, slot, raw) in &self.presets {
            let restored = known(raw).is_some_and(|id| {
                actor
                    .ability
                    .assign_preset(*page as usize, *slot as usize, id)
                    .is_ok()
            });
            if !restored {
                report.presets += 1;
            }
        }
        if actor.ability.set_active_page(self.active_page as usize).is_err() {
            report.fields += 1;
        }

        let pathway = match &self.pathway {
            None => None,
            Some(raw) => {
                let id = PathwayId::new(raw.as_str())
                    .ok()
                    .filter(|id| progression.pathway(id).is_some());
                if id.is_none() {
                    report.fields += 1;
                }
                id
            }
        };
        let tier = Tier::new(self.tier).unwrap_or_else(|_| {
            report.fields += 1;
            Tier::WEAKEST
        });
        actor.resource.set_progression(pathway, tier);
        if !self.current.is_finite() || self.current < 0.0 {
            report.fields += 1;
        }
        actor.resource.set_current(progression, self.current);
        actor.resource.set_combat_timer(self.combat_timer);

        actor.set_mastery(self.mastery);
        if let Some(query) = &self.query {
            actor.carrier.set_query(query.clone());
        }
        Ok((actor, report))
    }
}
