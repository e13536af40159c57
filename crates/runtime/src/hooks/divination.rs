//! Hook that turns a divination cast into a search.

use beyonder_core::{SearchMode, SkillTags};

use super::{HookAction, HookContext, HookError, HookPhase, SkillHook};

/// Runs a search with the caster's carrier query.
///
/// A cast that was held (non-zero hold ticks) starts a continuous search;
/// a plain cast divines once.
#[derive(Debug, Clone, Copy)]
pub struct DivinationHook;

impl SkillHook for DivinationHook {
    fn name(&self) -> &'static str {
        "divination"
    }

    fn should_trigger(&self, ctx: &HookContext<'_>) -> bool {
        ctx.is_cast() && ctx.skill.tags.contains(SkillTags::DIVINATION)
    }

    fn create_actions(&self, ctx: &HookContext<'_>) -> Result<Vec<HookAction>, HookError> {
        if ctx.actor.carrier.query().is_none() {
            return Err(HookError::NoQuery(ctx.actor.id));
        }
        let mode = match ctx.phase {
            HookPhase::Cast(cast) if cast.hold_ticks > 0 => SearchMode::Continuous,
            _ => SearchMode::Single,
        };
        Ok(vec![HookAction::Divine {
            actor: ctx.actor.id,
            mode,
        }])
    }
}
