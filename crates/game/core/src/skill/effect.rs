//! Effect callbacks invoked by the cast machine.
//!
//! The core decides *when* an effect fires; what it does is up to the host.
//! The runtime implements [`SkillEffects`] with a hook registry keyed by
//! each definition's `effect` key.

use crate::geometry::Vec3;
use crate::skill::SkillDefinition;
use crate::state::{ActorId, ActorState, SkillId};

/// Cast parameters supplied by the caller.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastContext {
    pub target: Option<ActorId>,
    pub aim: Option<Vec3>,
    /// Ticks the cast key was held (charging, channeling, chanting).
    pub hold_ticks: u32,
}

impl CastContext {
    pub fn targeting(target: ActorId) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    pub fn held(hold_ticks: u32) -> Self {
        Self {
            hold_ticks,
            ..Self::default()
        }
    }
}

/// Why a maintained skill stopped.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum DeactivationReason {
    /// Cast again by the actor.
    Manual,
    /// Upkeep could not be paid.
    Upkeep,
    Forgotten,
    /// Passive switched off through `set_passive_enabled`.
    Disabled,
}

/// Receiver of effect hooks.
pub trait SkillEffects {
    /// Fires on activation of a maintained skill and on every other cast.
    fn on_cast(&mut self, actor: &ActorState, skill: &SkillDefinition, context: &CastContext);

    fn on_deactivate(
        &mut self,
        _actor: &ActorState,
        _skill: &SkillDefinition,
        _reason: DeactivationReason,
    ) {
    }

    /// Fires once per tick for every active skill, passives included.
    fn on_active_tick(&mut self, _actor: &ActorState, _skill: &SkillDefinition, _duration: u32) {}
}

/// Effects sink that ignores every callback.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEffects;

impl SkillEffects for NoEffects {
    fn on_cast(&mut self, _actor: &ActorState, _skill: &SkillDefinition, _context: &CastContext) {}
}

/// Records every callback; handy in tests and for replay logs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordedEffects {
    pub calls: Vec<EffectCall>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EffectCall {
    Cast {
        actor: ActorId,
        skill: SkillId,
        hold_ticks: u32,
    },
    Deactivate {
        actor: ActorId,
        skill: SkillId,
        reason: DeactivationReason,
    },
    ActiveTick {
        actor: ActorId,
        skill: SkillId,
        duration: u32,
    },
}

impl RecordedEffects {
    pub fn casts(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, EffectCall::Cast { .. }))
            .count()
    }

    pub fn deactivations(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, EffectCall::Deactivate { .. }))
            .count()
    }
}

impl SkillEffects for RecordedEffects {
    fn on_cast(&mut self, actor: &ActorState, skill: &SkillDefinition, context: &CastContext) {
        self.calls.push(EffectCall::Cast {
            actor: actor.id,
            skill: skill.id.clone(),
            hold_ticks: context.hold_ticks,
        });
    }

    fn on_deactivate(
        &mut self,
        actor: &ActorState,
        skill: &SkillDefinition,
        reason: DeactivationReason,
    ) {
        self.calls.push(EffectCall::Deactivate {
            actor: actor.id,
            skill: skill.id.clone(),
            reason,
        });
    }

    fn on_active_tick(&mut self, actor: &ActorState, skill: &SkillDefinition, duration: u32) {
        self.calls.push(EffectCall::ActiveTick {
            actor: actor.id,
            skill: skill.id.clone(),
            duration,
        });
    }
}
