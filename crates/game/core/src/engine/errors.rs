//! Error types surfaced by the engine.

use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameError};
use crate::skill::CastRejection;
use crate::state::{ActorId, PathwayId, StateError};
use crate::sync::PersistError;

/// Errors surfaced while driving the simulation through [`GameEngine`].
///
/// [`GameEngine`]: super::GameEngine
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("actor {0} is not attached")]
    UnknownActor(ActorId),

    #[error("actor {0} is already attached")]
    ActorExists(ActorId),

    #[error("cast refused: {0}")]
    Cast(#[from] CastRejection),

    #[error("state update failed: {0}")]
    State(#[from] StateError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("pathway '{0}' is not registered")]
    UnknownPathway(PathwayId),

    #[error("actor {0} has no divination query")]
    NoDivinationQuery(ActorId),

    #[error("actor {0} has no pose in the world")]
    NoPose(ActorId),

    #[error("restore failed: {0}")]
    Persist(#[from] PersistError),
}

impl GameError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Cast(e) => e.severity(),
            Self::State(e) => e.severity(),
            Self::Oracle(e) => e.severity(),
            Self::Persist(e) => e.severity(),
            Self::UnknownActor(_)
            | Self::ActorExists(_)
            | Self::UnknownPathway(_)
            | Self::NoDivinationQuery(_) => ErrorSeverity::Validation,
            Self::NoPose(_) => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Cast(e) => e.error_code(),
            Self::State(e) => e.error_code(),
            Self::Oracle(e) => e.error_code(),
            Self::Persist(e) => e.error_code(),
            Self::UnknownActor(_) => "ENGINE_UNKNOWN_ACTOR",
            Self::ActorExists(_) => "ENGINE_ACTOR_EXISTS",
            Self::UnknownPathway(_) => "ENGINE_UNKNOWN_PATHWAY",
            Self::NoDivinationQuery(_) => "ENGINE_NO_DIVINATION_QUERY",
            Self::NoPose(_) => "ENGINE_NO_POSE",
        }
    }
}
