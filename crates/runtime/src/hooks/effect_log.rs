//! Hook that publishes effect activity to the event bus.

use super::{HookAction, HookContext, HookCriticality, HookError, HookPhase, SkillHook};
use crate::events::{EffectEvent, EffectPhase};

/// Publishes an [`EffectEvent`] for every cast and deactivation of a skill
/// that carries an effect key. Active ticks are not published.
#[derive(Debug, Clone, Copy)]
pub struct EffectLogHook;

impl SkillHook for EffectLogHook {
    fn name(&self) -> &'static str {
        "effect_log"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn criticality(&self) -> HookCriticality {
        HookCriticality::Optional
    }

    fn should_trigger(&self, ctx: &HookContext<'_>) -> bool {
        !matches!(ctx.phase, HookPhase::ActiveTick { .. })
    }

    fn create_actions(&self, ctx: &HookContext<'_>) -> Result<Vec<HookAction>, HookError> {
        let effect = ctx
            .skill
            .effect
            .clone()
            .ok_or_else(|| HookError::NoEffectKey {
                skill: ctx.skill.id.to_string(),
            })?;
        let (phase, target) = match ctx.phase {
            HookPhase::Cast(cast) => (
                EffectPhase::Cast {
                    hold_ticks: cast.hold_ticks,
                },
                cast.target,
            ),
            HookPhase::Deactivate(reason) => (EffectPhase::Deactivate(reason), None),
            HookPhase::ActiveTick { .. } => return Ok(Vec::new()),
        };
        Ok(vec![HookAction::Publish(EffectEvent {
            actor: ctx.actor.id,
            skill: ctx.skill.id.clone(),
            effect,
            target,
            phase,
        })])
    }
}
