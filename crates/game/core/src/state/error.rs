//! State management errors.

use crate::error::{ErrorSeverity, GameError};
use crate::state::SkillId;

/// Errors raised by direct mutations of actor state.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateError {
    #[error("skill '{0}' is not registered")]
    UnknownSkill(SkillId),

    #[error("skill '{0}' has not been learned")]
    NotLearned(SkillId),

    #[error("skill '{0}' is not a passive")]
    NotPassive(SkillId),

    #[error("preset page {page} is out of range (pages: {max})")]
    InvalidPage { page: usize, max: usize },

    #[error("preset slot {slot} is out of range (slots: {max})")]
    InvalidSlot { slot: usize, max: usize },

    #[error("skill '{0}' is active but not learned")]
    ActiveNotLearned(SkillId),

    #[error("a zero cooldown entry is stored")]
    ZeroCooldownStored,
}

impl GameError for StateError {
    fn severity(&self) -> ErrorSeverity {
        use StateError::*;
        match self {
            UnknownSkill(_) | NotLearned(_) | NotPassive(_) | InvalidPage { .. }
            | InvalidSlot { .. } => ErrorSeverity::Validation,

            ActiveNotLearned(_) | ZeroCooldownStored => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use StateError::*;
        match self {
            UnknownSkill(_) => "STATE_UNKNOWN_SKILL",
            NotLearned(_) => "STATE_NOT_LEARNED",
            NotPassive(_) => "STATE_NOT_PASSIVE",
            InvalidPage { .. } => "STATE_INVALID_PAGE",
            InvalidSlot { .. } => "STATE_INVALID_SLOT",
            ActiveNotLearned(_) => "STATE_ACTIVE_NOT_LEARNED",
            ZeroCooldownStored => "STATE_ZERO_COOLDOWN_STORED",
        }
    }
}
