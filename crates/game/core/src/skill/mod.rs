//! Skills: static definitions and the cast state machine.
mod cast;
mod definition;
mod effect;
mod error;
mod notice;

pub use cast::{CastIntent, CastMachine, CastOutcome, TickReport};
pub use definition::{CastKind, CastType, CooldownSpec, ScaledAmount, SkillDefinition, SkillTags};
pub use effect::{
    CastContext, DeactivationReason, EffectCall, NoEffects, RecordedEffects, SkillEffects,
};
pub use error::CastRejection;
pub use notice::Notice;
