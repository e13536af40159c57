//! Hook registry and the effects sink handed to the engine.

use std::sync::Arc;

use beyonder_core::{
    ActorState, CastContext, DeactivationReason, SkillDefinition, SkillEffects,
};
use tracing::{debug, error};

use super::{
    CombatHook, DivinationHook, EffectLogHook, HookAction, HookContext, HookCriticality,
    HookError, HookPhase, SkillHook,
};

/// A critical hook that failed while a command was running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFailure {
    pub hook: &'static str,
    pub error: HookError,
}

/// Registry that manages and executes skill hooks in priority order.
#[derive(Clone)]
pub struct HookRegistry {
    hooks: Arc<[Arc<dyn SkillHook>]>,
}

impl HookRegistry {
    /// Creates a registry; hooks are sorted by priority (lower values first).
    pub fn new(mut hooks: Vec<Arc<dyn SkillHook>>) -> Self {
        hooks.sort_by_key(|h| h.priority());
        Self {
            hooks: hooks.into(),
        }
    }

    /// Creates a registry with the default set of hooks.
    ///
    /// Default hooks include:
    /// - CombatHook: hostile casts put caster and target in combat
    /// - DivinationHook: divination casts run a search
    /// - EffectLogHook: publishes effect events
    pub fn default_hooks() -> Self {
        Self::new(Self::builtin())
    }

    /// Default hooks plus `additional`.
    pub fn with_additional(additional: Vec<Arc<dyn SkillHook>>) -> Self {
        let mut hooks = Self::builtin();
        hooks.extend(additional);
        Self::new(hooks)
    }

    fn builtin() -> Vec<Arc<dyn SkillHook>> {
        vec![
            Arc::new(CombatHook) as Arc<dyn SkillHook>,
            Arc::new(DivinationHook) as Arc<dyn SkillHook>,
            Arc::new(EffectLogHook) as Arc<dyn SkillHook>,
        ]
    }

    /// Evaluates every hook in priority order.
    ///
    /// Failures of important and optional hooks are logged and skipped.
    /// A critical failure stops evaluation and is returned; actions collected
    /// before it are still returned alongside.
    pub fn evaluate(&self, ctx: &HookContext<'_>) -> (Vec<HookAction>, Option<HookFailure>) {
        let mut actions = Vec::new();
        for hook in self.hooks.iter() {
            if !hook.should_trigger(ctx) {
                continue;
            }
            match hook.create_actions(ctx) {
                Ok(created) => actions.extend(created),
                Err(e) => {
                    if let Some(failure) = Self::handle_hook_error(hook.as_ref(), ctx, e) {
                        return (actions, Some(failure));
                    }
                }
            }
        }
        (actions, None)
    }

    /// Returns the number of hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns true if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Returns an iterator over hook names and priorities (for debugging).
    pub fn hooks(&self) -> impl Iterator<Item = (&'static str, i32)> + '_ {
        self.hooks.iter().map(|h| (h.name(), h.priority()))
    }

    /// Returns a failure only for critical hooks.
    fn handle_hook_error(
        hook: &dyn SkillHook,
        ctx: &HookContext<'_>,
        error: HookError,
    ) -> Option<HookFailure> {
        match hook.criticality() {
            HookCriticality::Critical => {
                error!(
                    target: "runtime::hooks",
                    hook = hook.name(),
                    actor = %ctx.actor.id,
                    skill = %ctx.skill.id,
                    error = %error,
                    "Critical hook failed"
                );
                Some(HookFailure {
                    hook: hook.name(),
                    error,
                })
            }
            HookCriticality::Important => {
                error!(
                    target: "runtime::hooks",
                    hook = hook.name(),
                    actor = %ctx.actor.id,
                    skill = %ctx.skill.id,
                    error = %error,
                    "Hook failed, continuing"
                );
                None
            }
            HookCriticality::Optional => {
                debug!(
                    target: "runtime::hooks",
                    hook = hook.name(),
                    error = %error,
                    "Optional hook failed"
                );
                None
            }
        }
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::default_hooks()
    }
}

/// [`SkillEffects`] sink that runs the hooks and buffers their actions.
///
/// The engine holds the actor mutably while it calls back, so the worker
/// drains the buffer and applies it after the command returns.
pub struct EffectCollector<'r> {
    registry: &'r HookRegistry,
    actions: Vec<HookAction>,
    failure: Option<HookFailure>,
}

impl<'r> EffectCollector<'r> {
    pub fn new(registry: &'r HookRegistry) -> Self {
        Self {
            registry,
            actions: Vec::new(),
            failure: None,
        }
    }

    fn run(&mut self, ctx: HookContext<'_>) {
        let (actions, failure) = self.registry.evaluate(&ctx);
        self.actions.extend(actions);
        if self.failure.is_none() {
            self.failure = failure;
        }
    }

    /// Collected actions and the first critical failure, if any.
    pub fn finish(self) -> (Vec<HookAction>, Option<HookFailure>) {
        (self.actions, self.failure)
    }
}

impl SkillEffects for EffectCollector<'_> {
    fn on_cast(&mut self, actor: &ActorState, skill: &SkillDefinition, context: &CastContext) {
        self.run(HookContext {
            actor,
            skill,
            phase: HookPhase::Cast(context),
        });
    }

    fn on_deactivate(
        &mut self,
        actor: &ActorState,
        skill: &SkillDefinition,
        reason: DeactivationReason,
    ) {
        self.run(HookContext {
            actor,
            skill,
            phase: HookPhase::Deactivate(reason),
        });
    }

    fn on_active_tick(&mut self, actor: &ActorState, skill: &SkillDefinition, duration: u32) {
        self.run(HookContext {
            actor,
            skill,
            phase: HookPhase::ActiveTick { duration },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beyonder_core::{ActorId, CastType, SkillId, SkillTags};

    fn skill(tags: SkillTags, effect: Option<&str>) -> SkillDefinition {
        let mut definition =
            SkillDefinition::new(SkillId::new("test:skill").unwrap(), CastType::Instant)
                .with_tags(tags);
        definition.effect = effect.map(str::to_owned);
        definition
    }

    struct AlwaysFails(HookCriticality);

    impl SkillHook for AlwaysFails {
        fn name(&self) -> &'static str {
            "always_fails"
        }

        fn priority(&self) -> i32 {
            -100
        }

        fn criticality(&self) -> HookCriticality {
            self.0
        }

        fn should_trigger(&self, _ctx: &HookContext<'_>) -> bool {
            true
        }

        fn create_actions(&self, ctx: &HookContext<'_>) -> Result<Vec<HookAction>, HookError> {
            Err(HookError::NoQuery(ctx.actor.id))
        }
    }

    #[test]
    fn hostile_cast_enters_combat_for_both_sides() {
        let registry = HookRegistry::default_hooks();
        let actor = ActorState::new(ActorId(1));
        let definition = skill(SkillTags::HOSTILE, Some("air_bullet"));
        let mut collector = EffectCollector::new(&registry);

        collector.on_cast(&actor, &definition, &CastContext::targeting(ActorId(2)));

        let (actions, failure) = collector.finish();
        assert!(failure.is_none());
        assert_eq!(actions[0], HookAction::EnterCombat(ActorId(1)));
        assert_eq!(actions[1], HookAction::EnterCombat(ActorId(2)));
        assert!(matches!(actions[2], HookAction::Publish(_)));
    }

    #[test]
    fn divination_without_query_is_logged_not_fatal() {
        let registry = HookRegistry::default_hooks();
        let actor = ActorState::new(ActorId(1));
        let definition = skill(SkillTags::DIVINATION, None);
        let mut collector = EffectCollector::new(&registry);

        collector.on_cast(&actor, &definition, &CastContext::default());

        let (actions, failure) = collector.finish();
        assert!(actions.is_empty());
        assert!(failure.is_none());
    }

    #[test]
    fn active_ticks_publish_nothing() {
        let registry = HookRegistry::default_hooks();
        let actor = ActorState::new(ActorId(1));
        let definition = skill(SkillTags::ENHANCED_SIGHT, Some("spirit_vision"));
        let mut collector = EffectCollector::new(&registry);

        collector.on_active_tick(&actor, &definition, 7);

        assert!(collector.finish().0.is_empty());
    }

    #[test]
    fn critical_failure_stops_evaluation() {
        let registry = HookRegistry::with_additional(vec![Arc::new(AlwaysFails(
            HookCriticality::Critical,
        ))]);
        assert_eq!(registry.hooks().next(), Some(("always_fails", -100)));
        let actor = ActorState::new(ActorId(1));
        let definition = skill(SkillTags::HOSTILE, Some("air_bullet"));
        let mut collector = EffectCollector::new(&registry);

        collector.on_cast(&actor, &definition, &CastContext::default());

        let (actions, failure) = collector.finish();
        assert!(actions.is_empty());
        assert_eq!(failure.map(|f| f.hook), Some("always_fails"));
    }

    #[test]
    fn optional_failure_is_ignored() {
        let registry = HookRegistry::new(vec![
            Arc::new(AlwaysFails(HookCriticality::Optional)) as Arc<dyn SkillHook>,
            Arc::new(CombatHook),
        ]);
        let actor = ActorState::new(ActorId(1));
        let definition = skill(SkillTags::HOSTILE, None);
        let mut collector = EffectCollector::new(&registry);

        collector.on_cast(&actor, &definition, &CastContext::default());

        let (actions, failure) = collector.finish();
        assert_eq!(actions, vec![HookAction::EnterCombat(ActorId(1))]);
        assert!(failure.is_none());
    }
}
