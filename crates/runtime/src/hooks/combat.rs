//! Hook that puts both sides of a hostile cast into combat.

use beyonder_core::SkillTags;

use super::{HookAction, HookContext, HookCriticality, HookError, HookPhase, SkillHook};

/// Hostile casts suppress regeneration for the caster and, when the cast
/// names one, for the target.
///
/// Runs at priority -10 so combat state is in place before any other
/// follow-up work.
#[derive(Debug, Clone, Copy)]
pub struct CombatHook;

impl SkillHook for CombatHook {
    fn name(&self) -> &'static str {
        "combat"
    }

    fn priority(&self) -> i32 {
        -10
    }

    fn criticality(&self) -> HookCriticality {
        HookCriticality::Important
    }

    fn should_trigger(&self, ctx: &HookContext<'_>) -> bool {
        ctx.is_cast() && ctx.skill.tags.contains(SkillTags::HOSTILE)
    }

    fn create_actions(&self, ctx: &HookContext<'_>) -> Result<Vec<HookAction>, HookError> {
        let mut actions = vec![HookAction::EnterCombat(ctx.actor.id)];
        if let HookPhase::Cast(cast) = ctx.phase
            && let Some(target) = cast.target
            && target != ctx.actor.id
        {
            actions.push(HookAction::EnterCombat(target));
        }
        Ok(actions)
    }
}
