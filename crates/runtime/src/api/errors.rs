//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories, the engine and
//! critical hooks so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use beyonder_core::{ActorId, EngineError, ErrorSeverity, GameError};

use crate::hooks::HookError;
pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The command was applied but a critical hook failed afterwards.
    #[error("critical hook '{hook}' failed: {error}")]
    HookFailed {
        hook: &'static str,
        #[source]
        error: HookError,
    },

    #[error("no save found for actor {0}")]
    SaveNotFound(ActorId),

    #[error("runtime has no actor repository configured")]
    NoRepository,

    #[error("runtime requires content or oracles to be configured before building")]
    MissingContent,
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Engine(e) => e.severity(),
            Self::SaveNotFound(_) | Self::NoRepository => ErrorSeverity::Validation,
            Self::HookFailed { .. } | Self::Repository(_) => ErrorSeverity::Recoverable,
            Self::CommandChannelClosed
            | Self::ReplyChannelClosed(_)
            | Self::WorkerJoin(_)
            | Self::MissingContent => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Engine(e) => e.error_code(),
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::Repository(_) => "RUNTIME_REPOSITORY",
            Self::HookFailed { .. } => "RUNTIME_HOOK_FAILED",
            Self::SaveNotFound(_) => "RUNTIME_SAVE_NOT_FOUND",
            Self::NoRepository => "RUNTIME_NO_REPOSITORY",
            Self::MissingContent => "RUNTIME_MISSING_CONTENT",
        }
    }
}
