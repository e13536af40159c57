//! Execution context provided to hooks during evaluation.

use beyonder_core::{ActorState, CastContext, DeactivationReason, SkillDefinition};

/// Which effect callback is being evaluated.
#[derive(Debug, Clone, Copy)]
pub enum HookPhase<'a> {
    Cast(&'a CastContext),
    Deactivate(DeactivationReason),
    /// Fires every tick for every active skill.
    ActiveTick { duration: u32 },
}

/// Read-only view of the callback a hook is evaluating.
pub struct HookContext<'a> {
    /// Actor state after the cast machine applied the cast.
    pub actor: &'a ActorState,
    pub skill: &'a SkillDefinition,
    pub phase: HookPhase<'a>,
}

impl HookContext<'_> {
    pub fn is_cast(&self) -> bool {
        matches!(self.phase, HookPhase::Cast(_))
    }
}
