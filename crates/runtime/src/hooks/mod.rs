//! Skill effect hooks.
//!
//! The core decides *when* a skill effect fires; hooks decide what the
//! runtime does about it. Each hook inspects a [`HookContext`] and returns
//! [`HookAction`]s. Actions are collected while the engine is running and
//! applied by the simulation worker once the command returns, so hooks
//! never touch simulation state directly.
//!
//! # Architecture
//!
//! - Hooks are registered in the RuntimeBuilder and sorted by priority
//! - Every effect callback evaluates the hooks in priority order
//! - A failing hook is handled according to its [`HookCriticality`]

mod combat;
mod context;
mod divination;
mod effect_log;
mod registry;

pub use combat::CombatHook;
pub use context::{HookContext, HookPhase};
pub use divination::DivinationHook;
pub use effect_log::EffectLogHook;
pub use registry::{EffectCollector, HookFailure, HookRegistry};

use beyonder_core::{ActorId, SearchMode};

use crate::events::EffectEvent;

/// Defines the criticality level of a hook for error handling.
///
/// This enum determines how hook failures are handled during execution:
/// - Critical hooks fail the command that triggered them
/// - Important hooks log errors but allow continuation
/// - Optional hooks can fail silently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookCriticality {
    /// Hook failure is reported back to the caller of the command.
    ///
    /// The cast itself has already been applied by then.
    Critical,

    /// Hook failure should be logged as error but allow continuation.
    ///
    /// This is the default level.
    Important,

    /// Hook failure is expected and can be silently ignored.
    Optional,
}

/// Follow-up work requested by a hook.
#[derive(Debug, Clone, PartialEq)]
pub enum HookAction {
    /// Put an actor into combat (suppresses regeneration).
    EnterCombat(ActorId),
    /// Run a divination search with the actor's carrier query.
    Divine { actor: ActorId, mode: SearchMode },
    /// Publish an effect event.
    Publish(EffectEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HookError {
    #[error("actor {0} has no divination query")]
    NoQuery(ActorId),

    #[error("skill '{skill}' has no effect key")]
    NoEffectKey { skill: String },
}

/// Hook evaluated on every skill effect callback.
///
/// Hooks are sorted by priority (lower values execute first):
/// - Negative priorities: state-affecting hooks (combat)
/// - Zero: Default priority for most hooks
/// - Positive priorities: Optional or cosmetic hooks
pub trait SkillHook: Send + Sync {
    /// Returns a human-readable name for this hook (used in logging and debugging).
    fn name(&self) -> &'static str;

    /// Returns the execution priority. Lower values execute first.
    fn priority(&self) -> i32 {
        0
    }

    fn criticality(&self) -> HookCriticality {
        HookCriticality::Important
    }

    /// Determines whether this hook should trigger for the callback.
    fn should_trigger(&self, ctx: &HookContext<'_>) -> bool;

    /// Creates the follow-up actions. Only called when `should_trigger` is true.
    fn create_actions(&self, ctx: &HookContext<'_>) -> Result<Vec<HookAction>, HookError>;
}
