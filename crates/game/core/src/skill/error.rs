use crate::error::{ErrorSeverity, GameError};
use crate::skill::Notice;
use crate::state::SkillId;

/// Why a cast was refused. Refusals never mutate state.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastRejection {
    #[error("skill '{0}' is not registered")]
    UnknownSkill(SkillId),

    #[error("skill '{0}' has not been learned")]
    NotLearned(SkillId),

    #[error("skill '{0}' is passive and cannot be cast")]
    PassiveNotCastable(SkillId),

    #[error("actor is not a Beyonder")]
    NotBeyonder,

    #[error("skill '{skill}' is on cooldown for {remaining} more ticks")]
    OnCooldown { skill: SkillId, remaining: u32 },

    #[error("skill '{0}' cannot be deactivated")]
    CannotDeactivate(SkillId),

    #[error("skill '{skill}' needs {required:.1} spirituality, {available:.1} available")]
    InsufficientSpirituality {
        skill: SkillId,
        required: f64,
        available: f64,
    },

    #[error("preset slot {slot} on page {page} is empty")]
    EmptySlot { page: usize, slot: usize },

    #[error("preset slot {slot} is out of range")]
    InvalidSlot { slot: usize },
}

impl CastRejection {
    /// Notice shown to the actor, for the refusals that warrant one.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            CastRejection::OnCooldown { skill, remaining } => Some(Notice::OnCooldown {
                skill: skill.clone(),
                remaining: *remaining,
            }),
            CastRejection::InsufficientSpirituality {
                skill,
                required,
                available,
            } => Some(Notice::ResourceLow {
                skill: skill.clone(),
                required: *required,
                available: *available,
            }),
            _ => None,
        }
    }
}

impl GameError for CastRejection {
    fn severity(&self) -> ErrorSeverity {
        use CastRejection::*;
        match self {
            OnCooldown { .. } | InsufficientSpirituality { .. } => ErrorSeverity::Recoverable,
            UnknownSkill(_) | NotLearned(_) | PassiveNotCastable(_) | NotBeyonder
            | CannotDeactivate(_) | EmptySlot { .. } | InvalidSlot { .. } => {
                ErrorSeverity::Validation
            }
        }
    }

    fn error_code(&self) -> &'static str {
        use CastRejection::*;
        match self {
            UnknownSkill(_) => "CAST_UNKNOWN_SKILL",
            NotLearned(_) => "CAST_NOT_LEARNED",
            PassiveNotCastable(_) => "CAST_PASSIVE",
            NotBeyonder => "CAST_NOT_BEYONDER",
            OnCooldown { .. } => "CAST_ON_COOLDOWN",
            CannotDeactivate(_) => "CAST_CANNOT_DEACTIVATE",
            InsufficientSpirituality { .. } => "CAST_INSUFFICIENT_SPIRITUALITY",
            EmptySlot { .. } => "CAST_EMPTY_SLOT",
            InvalidSlot { .. } => "CAST_INVALID_SLOT",
        }
    }
}
