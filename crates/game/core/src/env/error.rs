//! Oracle access and registry errors.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{PathwayId, SkillId, Tier};

/// Errors that occur when accessing oracle data.
///
/// Missing oracles are fatal: the engine cannot run a cast or a search
/// without its registries and world access.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("SkillOracle not available")]
    SkillsNotAvailable,

    #[error("ProgressionOracle not available")]
    ProgressionNotAvailable,

    #[error("AttributeOracle not available")]
    AttributesNotAvailable,

    #[error("WorldOracle not available")]
    WorldNotAvailable,

    #[error("RngOracle not available")]
    RngNotAvailable,

    #[error("skill '{0}' is not registered")]
    UnknownSkill(SkillId),

    #[error("pathway '{0}' is not registered")]
    UnknownPathway(PathwayId),
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            SkillsNotAvailable | ProgressionNotAvailable | AttributesNotAvailable
            | WorldNotAvailable | RngNotAvailable => ErrorSeverity::Fatal,

            UnknownSkill(_) | UnknownPathway(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            SkillsNotAvailable => "ORACLE_SKILLS_NOT_AVAILABLE",
            ProgressionNotAvailable => "ORACLE_PROGRESSION_NOT_AVAILABLE",
            AttributesNotAvailable => "ORACLE_ATTRIBUTES_NOT_AVAILABLE",
            WorldNotAvailable => "ORACLE_WORLD_NOT_AVAILABLE",
            RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
            UnknownSkill(_) => "ORACLE_UNKNOWN_SKILL",
            UnknownPathway(_) => "ORACLE_UNKNOWN_PATHWAY",
        }
    }
}

/// Errors raised while building the immutable registries.
///
/// Registration happens once at startup; any of these is a content bug.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("skill '{0}' is registered twice")]
    DuplicateSkill(SkillId),

    #[error("pathway '{0}' is registered twice")]
    DuplicatePathway(PathwayId),

    #[error("pathway '{pathway}' lists {tier} more than once")]
    DuplicateTier { pathway: PathwayId, tier: Tier },

    #[error("pathway '{pathway}' unlocks unregistered skill '{skill}'")]
    UnknownSkill { pathway: PathwayId, skill: SkillId },
}

impl GameError for RegistryError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            RegistryError::DuplicateSkill(_) => "REGISTRY_DUPLICATE_SKILL",
            RegistryError::DuplicatePathway(_) => "REGISTRY_DUPLICATE_PATHWAY",
            RegistryError::DuplicateTier { .. } => "REGISTRY_DUPLICATE_TIER",
            RegistryError::UnknownSkill { .. } => "REGISTRY_UNKNOWN_SKILL",
        }
    }
}
