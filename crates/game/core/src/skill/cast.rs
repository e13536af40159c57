//! The skill cast state machine.
//!
//! [`CastMachine`] orchestrates [`AbilityState`](crate::state::AbilityState)
//! and [`ResourceState`](crate::state::ResourceState) for every cast type:
//! validation, activation and deactivation of maintained skills, one-shot
//! casts, per-tick upkeep, learning and forgetting.
//!
//! Validation order matters and is fixed: unknown or unlearned skills and
//! passives are refused first, then unrestricted actors bypass every other
//! check, then the Beyonder flag, the cooldown, the deactivation permission
//! and finally the cost.

use crate::config::GameConfig;
use crate::env::{GameEnv, OracleError, ProgressionOracle, SkillOracle};
use crate::skill::{
    CastContext, CastRejection, DeactivationReason, Notice, SkillDefinition, SkillEffects,
};
use crate::state::{ActorState, SkillId, StateError};

/// What a validated cast will do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CastIntent {
    /// Switch on an inactive maintained skill.
    Activate,
    /// Switch off an active maintained skill.
    Deactivate,
    /// Any non-maintained cast.
    Fire,
}

/// Result of an accepted cast.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastOutcome {
    pub skill: SkillId,
    pub intent: CastIntent,
    pub cost_paid: f64,
    /// Cooldown applied by this cast.
    pub cooldown: u32,
    pub notice: Option<Notice>,
}

/// Per-actor result of one simulation tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub notices: Vec<Notice>,
    pub regenerated: f64,
}

/// Stateless orchestrator over actor state; all state lives in [`ActorState`].
#[derive(Clone, Copy)]
pub struct CastMachine<'a> {
    skills: &'a dyn SkillOracle,
    progression: &'a dyn ProgressionOracle,
    config: &'a GameConfig,
}

impl<'a> CastMachine<'a> {
    pub fn new(
        skills: &'a dyn SkillOracle,
        progression: &'a dyn ProgressionOracle,
        config: &'a GameConfig,
    ) -> Self {
        Self {
            skills,
            progression,
            config,
        }
    }

    /// Builds a machine from the skill and progression oracles of `env`.
    pub fn from_env(env: &GameEnv<'a>, config: &'a GameConfig) -> Result<Self, OracleError> {
        Ok(Self::new(env.skills()?, env.progression()?, config))
    }

    fn definition(&self, id: &SkillId) -> Result<&'a SkillDefinition, CastRejection> {
        self.skills
            .definition(id)
            .ok_or_else(|| CastRejection::UnknownSkill(id.clone()))
    }

    /// Validates a cast without touching state.
    pub fn check(&self, actor: &ActorState, id: &SkillId) -> Result<CastIntent, CastRejection> {
        let definition = self.definition(id)?;
        if !actor.ability.is_learned(id) {
            return Err(CastRejection::NotLearned(id.clone()));
        }
        if definition.is_passive() {
            return Err(CastRejection::PassiveNotCastable(id.clone()));
        }

        let intent = if definition.is_maintained() {
            if actor.ability.is_active(id) {
                CastIntent::Deactivate
            } else {
                CastIntent::Activate
            }
        } else {
            CastIntent::Fire
        };

        if actor.is_unrestricted() {
            return Ok(intent);
        }
        if !actor.is_beyonder() {
            return Err(CastRejection::NotBeyonder);
        }

        let remaining = actor.ability.cooldown(id);
        if remaining > 0 {
            return Err(CastRejection::OnCooldown {
                skill: id.clone(),
                remaining,
            });
        }

        if intent == CastIntent::Deactivate {
            if !definition.cast_type.can_be_deactivated() {
                return Err(CastRejection::CannotDeactivate(id.clone()));
            }
            return Ok(intent);
        }

        let required = definition.cost_at(actor.tier());
        let available = actor.resource.effective_current(self.progression);
        if available < required {
            return Err(CastRejection::InsufficientSpirituality {
                skill: id.clone(),
                required,
                available,
            });
        }
        Ok(intent)
    }

    pub fn can_cast(&self, actor: &ActorState, id: &SkillId) -> bool {
        self.check(actor, id).is_ok()
    }

    /// Validates and performs a cast.
    pub fn cast(
        &self,
        actor: &mut ActorState,
        id: &SkillId,
        context: &CastContext,
        effects: &mut dyn SkillEffects,
    ) -> Result<CastOutcome, CastRejection> {
        let intent = self.check(actor, id)?;
        let definition = self.definition(id)?;
        let free = actor.is_unrestricted();
        let tier = actor.tier();

        match intent {
            CastIntent::Deactivate => {
                let notice = self.deactivate(actor, id, DeactivationReason::Manual, effects);
                Ok(CastOutcome {
                    skill: id.clone(),
                    intent,
                    cost_paid: 0.0,
                    cooldown: actor.ability.cooldown(id),
                    notice,
                })
            }
            CastIntent::Activate => {
                let cost = if free { 0.0 } else { definition.cost_at(tier) };
                if !actor.resource.consume(self.progression, cost) {
                    return Err(self.insufficient(actor, definition));
                }
                actor
                    .ability
                    .activate(id.clone())
                    .map_err(|_| CastRejection::NotLearned(id.clone()))?;
                let cooldown = if free {
                    0
                } else {
                    GameConfig::TOGGLE_GUARD_TICKS
                };
                actor.ability.set_cooldown(id.clone(), cooldown);
                effects.on_cast(actor, definition, context);
                Ok(CastOutcome {
                    skill: id.clone(),
                    intent,
                    cost_paid: cost,
                    cooldown,
                    notice: Some(Notice::Activated(id.clone())),
                })
            }
            CastIntent::Fire => {
                let limit = definition.cast_type.hold_limit();
                let clamped = CastContext {
                    hold_ticks: context.hold_ticks.min(limit),
                    ..context.clone()
                };
                effects.on_cast(actor, definition, &clamped);

                let cost = if free { 0.0 } else { definition.cost_at(tier) };
                let paid = actor.resource.consume(self.progression, cost);
                debug_assert!(paid, "cost was validated before the effect fired");
                let cooldown = if free {
                    0
                } else {
                    definition.cooldown_ticks(tier)
                };
                actor.ability.set_cooldown(id.clone(), cooldown);
                Ok(CastOutcome {
                    skill: id.clone(),
                    intent,
                    cost_paid: if paid { cost } else { 0.0 },
                    cooldown,
                    notice: None,
                })
            }
        }
    }

    fn insufficient(&self, actor: &ActorState, definition: &SkillDefinition) -> CastRejection {
        CastRejection::InsufficientSpirituality {
            skill: definition.id.clone(),
            required: definition.cost_at(actor.tier()),
            available: actor.resource.current(),
        }
    }

    /// Casts whatever is bound to `slot` on the active page.
    pub fn cast_preset(
        &self,
        actor: &mut ActorState,
        slot: usize,
        context: &CastContext,
        effects: &mut dyn SkillEffects,
    ) -> Result<CastOutcome, CastRejection> {
        let page = actor.ability.active_page();
        let id = actor
            .ability
            .preset(page, slot)
            .map_err(|_| CastRejection::InvalidSlot { slot })?
            .cloned()
            .ok_or(CastRejection::EmptySlot { page, slot })?;
        self.cast(actor, &id, context, effects)
    }

    /// Switches off an active skill. Idempotent: inactive skills yield `None`.
    ///
    /// Manual and upkeep deactivations apply the skill's full cooldown
    /// (never for unrestricted actors).
    pub fn deactivate(
        &self,
        actor: &mut ActorState,
        id: &SkillId,
        reason: DeactivationReason,
        effects: &mut dyn SkillEffects,
    ) -> Option<Notice> {
        if !actor.ability.deactivate(id) {
            return None;
        }
        if let Some(definition) = self.skills.definition(id) {
            effects.on_deactivate(actor, definition, reason);
            let applies_cooldown =
                matches!(reason, DeactivationReason::Manual | DeactivationReason::Upkeep);
            if applies_cooldown && !actor.is_unrestricted() {
                actor
                    .ability
                    .set_cooldown(id.clone(), definition.cooldown_ticks(actor.tier()));
            }
        }
        Some(match reason {
            DeactivationReason::Upkeep => Notice::AutoDeactivated(id.clone()),
            _ => Notice::Deactivated(id.clone()),
        })
    }

    /// Per-tick maintenance of one active skill: upkeep, then the tick hook.
    pub fn active_tick(
        &self,
        actor: &mut ActorState,
        id: &SkillId,
        effects: &mut dyn SkillEffects,
    ) -> Option<Notice> {
        let Some(definition) = self.skills.definition(id) else {
            actor.ability.deactivate(id);
            return None;
        };
        if !actor.is_unrestricted() {
            let upkeep = definition.upkeep_at(actor.tier());
            if upkeep > 0.0 && !actor.resource.consume(self.progression, upkeep) {
                return self.deactivate(actor, id, DeactivationReason::Upkeep, effects);
            }
        }
        let duration = actor.ability.active_duration(id).unwrap_or(0);
        effects.on_active_tick(actor, definition, duration);
        None
    }

    /// Advances one actor by one tick in the fixed order: cooldowns,
    /// active durations, active-skill hooks with upkeep, then the resource.
    pub fn tick(&self, actor: &mut ActorState, effects: &mut dyn SkillEffects) -> TickReport {
        actor.ability.tick_cooldowns();
        actor.ability.tick_durations();

        let mut report = TickReport::default();
        let active: Vec<SkillId> = actor.ability.active_skills().cloned().collect();
        for id in &active {
            if let Some(notice) = self.active_tick(actor, id, effects) {
                report.notices.push(notice);
            }
        }
        report.regenerated = actor.resource.tick(self.progression, self.config);
        report
    }

    /// Learns a skill. Idempotent; passives switch on immediately at no cost.
    pub fn learn(&self, actor: &mut ActorState, id: &SkillId) -> Result<Option<Notice>, StateError> {
        let definition = self
            .skills
            .definition(id)
            .ok_or_else(|| StateError::UnknownSkill(id.clone()))?;
        if !actor.ability.insert_learned(id.clone(), self.skills) {
            return Ok(None);
        }
        if definition.is_passive() {
            actor.ability.activate(id.clone())?;
        }
        Ok(Some(Notice::Learned(id.clone())))
    }

    /// Forgets a skill everywhere it appears. Idempotent.
    pub fn forget(
        &self,
        actor: &mut ActorState,
        id: &SkillId,
        effects: &mut dyn SkillEffects,
    ) -> Option<Notice> {
        self.deactivate(actor, id, DeactivationReason::Forgotten, effects);
        actor
            .ability
            .purge(id)
            .then(|| Notice::Forgotten(id.clone()))
    }

    /// The only way to switch a learned passive off or back on.
    pub fn set_passive_enabled(
        &self,
        actor: &mut ActorState,
        id: &SkillId,
        enabled: bool,
        effects: &mut dyn SkillEffects,
    ) -> Result<Option<Notice>, StateError> {
        let definition = self
            .skills
            .definition(id)
            .ok_or_else(|| StateError::UnknownSkill(id.clone()))?;
        if !actor.ability.is_learned(id) {
            return Err(StateError::NotLearned(id.clone()));
        }
        if !definition.is_passive() {
            return Err(StateError::NotPassive(id.clone()));
        }
        if !enabled {
            return Ok(self.deactivate(actor, id, DeactivationReason::Disabled, effects));
        }
        if actor.ability.is_active(id) {
            return Ok(None);
        }
        actor.ability.activate(id.clone())?;
        Ok(Some(Notice::Activated(id.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ActorFlags, ActorId, Tier};
    use crate::skill::{NoEffects, RecordedEffects};
    use crate::testing::{
        AIR_BULLET, DANGER_SENSE, MIND_READ, PAPER_SUBSTITUTE, SPIRIT_BODY, SPIRIT_VISION,
        beyonder, id, pathways, skills,
    };

    struct Fixture {
        skills: crate::env::SkillRegistry,
        pathways: crate::env::PathwayRegistry,
        config: GameConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                skills: skills(),
                pathways: pathways(),
                config: GameConfig::default(),
            }
        }

        fn machine(&self) -> CastMachine<'_> {
            CastMachine::new(&self.skills, &self.pathways, &self.config)
        }
    }

    fn learned(fixture: &Fixture, tier: u8, ids: &[&str]) -> ActorState {
        let mut actor = beyonder(1, tier, &fixture.pathways);
        for raw in ids {
            fixture.machine().learn(&mut actor, &id(raw)).unwrap();
        }
        actor
    }

    #[test]
    fn instant_cast_pays_cost_and_cooldown() {
        let fixture = Fixture::new();
        let machine = fixture.machine();
        let mut actor = learned(&fixture, 9, &[MIND_READ]);
        assert_eq!(actor.resource.max(&fixture.pathways), 150.0);
        assert_eq!(actor.resource.current(), 150.0);

        let outcome = machine
            .cast(&mut actor, &id(MIND_READ), &CastContext::default(), &mut NoEffects)
            .unwrap();
        assert_eq!(outcome.intent, CastIntent::Fire);
        assert_eq!(actor.resource.current(), 140.0);
        assert_eq!(actor.ability.cooldown(&id(MIND_READ)), 60);

        for _ in 0..59 {
            machine.tick(&mut actor, &mut NoEffects);
        }
        assert_eq!(actor.ability.cooldown(&id(MIND_READ)), 1);
        machine.tick(&mut actor, &mut NoEffects);
        assert_eq!(actor.ability.cooldown(&id(MIND_READ)), 0);
        assert!(machine.can_cast(&actor, &id(MIND_READ)));
    }

    #[test]
    fn toggle_upkeep_drains_and_auto_deactivates() {
        let skills = skills();
        let pathways = pathways();
        let config = GameConfig::default();
        let machine = CastMachine::new(&skills, &pathways, &config);
        let vision = id(SPIRIT_VISION);

        let mut actor = ActorState::new(ActorId(7)).with_flags(ActorFlags::BEYONDER);
        machine.learn(&mut actor, &vision).unwrap();
        actor.resource.fill(&pathways);
        assert_eq!(actor.resource.current(), 100.0);

        let outcome = machine
            .cast(&mut actor, &vision, &CastContext::default(), &mut NoEffects)
            .unwrap();
        assert_eq!(outcome.intent, CastIntent::Activate);
        assert_eq!(actor.resource.current(), 90.0);
        assert!(actor.ability.is_active(&vision));

        // upkeep alone, without the regen step of a full tick
        let mut effects = RecordedEffects::default();
        let mut auto = Vec::new();
        for tick in 1..=200 {
            if !actor.ability.is_active(&vision) {
                continue;
            }
            auto.extend(machine.active_tick(&mut actor, &vision, &mut effects));
            if tick == 180 {
                assert_eq!(actor.resource.current(), 0.0);
                assert!(actor.ability.is_active(&vision));
            }
        }
        assert_eq!(actor.resource.current(), 0.0);
        assert!(!actor.ability.is_active(&vision));
        assert_eq!(auto, vec![Notice::AutoDeactivated(vision.clone())]);
        assert_eq!(effects.deactivations(), 1);
        assert_eq!(actor.ability.cooldown(&vision), 60);
    }

    #[test]
    fn full_ticks_cannot_outpace_upkeep() {
        let skills = skills();
        let pathways = pathways();
        let config = GameConfig::default();
        let machine = CastMachine::new(&skills, &pathways, &config);
        let vision = id(SPIRIT_VISION);

        let mut actor = ActorState::new(ActorId(7)).with_flags(ActorFlags::BEYONDER);
        machine.learn(&mut actor, &vision).unwrap();
        actor.resource.fill(&pathways);
        machine
            .cast(&mut actor, &vision, &CastContext::default(), &mut NoEffects)
            .unwrap();

        let mut auto = Vec::new();
        for _ in 0..200 {
            auto.extend(machine.tick(&mut actor, &mut NoEffects).notices);
            assert!(actor.resource.current() >= 0.0);
            assert!(actor.resource.current() <= actor.resource.cached_max());
        }
        assert!(!actor.ability.is_active(&vision));
        assert_eq!(auto, vec![Notice::AutoDeactivated(vision)]);
    }

    #[test]
    fn toggle_round_trip_restores_active_set() {
        let fixture = Fixture::new();
        let machine = fixture.machine();
        let mut actor = learned(&fixture, 9, &[SPIRIT_VISION, DANGER_SENSE]);
        let before: Vec<SkillId> = actor.ability.active_skills().cloned().collect();

        let mut effects = RecordedEffects::default();
        machine
            .cast(&mut actor, &id(SPIRIT_VISION), &CastContext::default(), &mut effects)
            .unwrap();
        assert_eq!(
            actor.ability.cooldown(&id(SPIRIT_VISION)),
            GameConfig::TOGGLE_GUARD_TICKS
        );
        let blocked = machine.check(&actor, &id(SPIRIT_VISION));
        assert!(matches!(blocked, Err(CastRejection::OnCooldown { .. })));

        for _ in 0..GameConfig::TOGGLE_GUARD_TICKS {
            machine.tick(&mut actor, &mut effects);
        }
        let outcome = machine
            .cast(&mut actor, &id(SPIRIT_VISION), &CastContext::default(), &mut effects)
            .unwrap();
        assert_eq!(outcome.intent, CastIntent::Deactivate);
        assert_eq!(outcome.notice, Some(Notice::Deactivated(id(SPIRIT_VISION))));
        assert_eq!(effects.casts(), 1);
        assert_eq!(effects.deactivations(), 1);

        let after: Vec<SkillId> = actor.ability.active_skills().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(actor.ability.cooldown(&id(SPIRIT_VISION)), 60);
    }

    #[test]
    fn non_deactivatable_toggle_refuses_without_mutation() {
        let fixture = Fixture::new();
        let machine = fixture.machine();
        let mut actor = learned(&fixture, 7, &[SPIRIT_BODY]);
        machine
            .cast(&mut actor, &id(SPIRIT_BODY), &CastContext::default(), &mut NoEffects)
            .unwrap();
        actor.ability.clear_cooldowns();
        let snapshot = actor.clone();

        let err = machine
            .cast(&mut actor, &id(SPIRIT_BODY), &CastContext::default(), &mut NoEffects)
            .unwrap_err();
        assert_eq!(err, CastRejection::CannotDeactivate(id(SPIRIT_BODY)));
        assert_eq!(actor, snapshot);
    }

    #[test]
    fn low_resource_refusal_emits_notice_without_mutation() {
        let fixture = Fixture::new();
        let machine = fixture.machine();
        let mut actor = learned(&fixture, 9, &[MIND_READ]);
        actor.resource.set_current(&fixture.pathways, 4.0);
        let snapshot = actor.clone();

        let err = machine
            .cast(&mut actor, &id(MIND_READ), &CastContext::default(), &mut NoEffects)
            .unwrap_err();
        assert!(matches!(
            err.notice(),
            Some(Notice::ResourceLow { required, .. }) if required == 10.0
        ));
        assert_eq!(actor, snapshot);
    }

    #[test]
    fn validation_order() {
        let fixture = Fixture::new();
        let machine = fixture.machine();
        let mut actor = learned(&fixture, 9, &[MIND_READ, DANGER_SENSE]);

        let unknown = id("seer:nothing");
        assert_eq!(
            machine.check(&actor, &unknown),
            Err(CastRejection::UnknownSkill(unknown.clone()))
        );
        assert_eq!(
            machine.check(&actor, &id(AIR_BULLET)),
            Err(CastRejection::NotLearned(id(AIR_BULLET)))
        );
        assert_eq!(
            machine.check(&actor, &id(DANGER_SENSE)),
            Err(CastRejection::PassiveNotCastable(id(DANGER_SENSE)))
        );

        actor.flags = ActorFlags::empty();
        assert_eq!(
            machine.check(&actor, &id(MIND_READ)),
            Err(CastRejection::NotBeyonder)
        );

        actor.flags = ActorFlags::UNRESTRICTED;
        actor.ability.set_cooldown(id(MIND_READ), 30);
        actor.resource.set_current(&fixture.pathways, 0.0);
        assert_eq!(machine.check(&actor, &id(MIND_READ)), Ok(CastIntent::Fire));
    }

    #[test]
    fn unrestricted_actor_pays_nothing() {
        let fixture = Fixture::new();
        let machine = fixture.machine();
        let mut actor = learned(&fixture, 9, &[MIND_READ, SPIRIT_VISION]);
        actor.flags |= ActorFlags::UNRESTRICTED;
        actor.resource.set_current(&fixture.pathways, 0.0);

        let outcome = machine
            .cast(&mut actor, &id(MIND_READ), &CastContext::default(), &mut NoEffects)
            .unwrap();
        assert_eq!(outcome.cost_paid, 0.0);
        assert_eq!(actor.ability.cooldown(&id(MIND_READ)), 0);

        machine
            .cast(&mut actor, &id(SPIRIT_VISION), &CastContext::default(), &mut NoEffects)
            .unwrap();
        for _ in 0..100 {
            machine.tick(&mut actor, &mut NoEffects);
        }
        assert!(actor.ability.is_active(&id(SPIRIT_VISION)));
    }

    #[test]
    fn charge_time_is_clamped() {
        let fixture = Fixture::new();
        let machine = fixture.machine();
        let mut actor = learned(&fixture, 7, &[PAPER_SUBSTITUTE]);
        let mut effects = RecordedEffects::default();

        let outcome = machine
            .cast(
                &mut actor,
                &id(PAPER_SUBSTITUTE),
                &CastContext::held(500),
                &mut effects,
            )
            .unwrap();
        assert_eq!(
            effects.calls[0],
            crate::skill::EffectCall::Cast {
                actor: actor.id,
                skill: id(PAPER_SUBSTITUTE),
                hold_ticks: 40,
            }
        );
        // 100 base, 10 per rank at rank 2
        assert_eq!(outcome.cooldown, 80);
    }

    #[test]
    fn learning_a_passive_activates_it_for_free() {
        let fixture = Fixture::new();
        let machine = fixture.machine();
        let mut actor = beyonder(1, 9, &fixture.pathways);
        let before = actor.resource.current();

        let notice = machine.learn(&mut actor, &id(DANGER_SENSE)).unwrap();
        assert_eq!(notice, Some(Notice::Learned(id(DANGER_SENSE))));
        assert!(actor.ability.is_learned(&id(DANGER_SENSE)));
        assert!(actor.ability.is_active(&id(DANGER_SENSE)));
        assert_eq!(actor.resource.current(), before);
        assert_eq!(machine.learn(&mut actor, &id(DANGER_SENSE)).unwrap(), None);
    }

    #[test]
    fn passives_toggle_only_through_set_passive_enabled() {
        let fixture = Fixture::new();
        let machine = fixture.machine();
        let mut actor = learned(&fixture, 9, &[DANGER_SENSE, MIND_READ]);

        let off = machine
            .set_passive_enabled(&mut actor, &id(DANGER_SENSE), false, &mut NoEffects)
            .unwrap();
        assert_eq!(off, Some(Notice::Deactivated(id(DANGER_SENSE))));
        assert_eq!(actor.ability.cooldown(&id(DANGER_SENSE)), 0);
        assert!(!actor.ability.is_active(&id(DANGER_SENSE)));

        machine
            .set_passive_enabled(&mut actor, &id(DANGER_SENSE), true, &mut NoEffects)
            .unwrap();
        assert!(actor.ability.is_active(&id(DANGER_SENSE)));
        assert_eq!(
            machine.set_passive_enabled(&mut actor, &id(MIND_READ), true, &mut NoEffects),
            Err(StateError::NotPassive(id(MIND_READ)))
        );
    }

    #[test]
    fn forget_is_idempotent() {
        let fixture = Fixture::new();
        let machine = fixture.machine();
        let mut actor = learned(&fixture, 9, &[SPIRIT_VISION, MIND_READ]);
        machine
            .cast(&mut actor, &id(SPIRIT_VISION), &CastContext::default(), &mut NoEffects)
            .unwrap();
        actor.ability.assign_preset(0, 0, id(SPIRIT_VISION)).unwrap();

        let first = machine.forget(&mut actor, &id(SPIRIT_VISION), &mut NoEffects);
        assert_eq!(first, Some(Notice::Forgotten(id(SPIRIT_VISION))));
        let once = actor.clone();
        assert_eq!(
            machine.forget(&mut actor, &id(SPIRIT_VISION), &mut NoEffects),
            None
        );
        assert_eq!(actor, once);
        assert!(!actor.ability.is_active(&id(SPIRIT_VISION)));
        assert_eq!(actor.ability.cooldown(&id(SPIRIT_VISION)), 0);
        assert_eq!(actor.ability.preset(0, 0).unwrap(), None);
        assert!(actor.ability.validate(&fixture.skills).is_ok());
    }

    #[test]
    fn deactivating_inactive_skill_is_noop() {
        let fixture = Fixture::new();
        let machine = fixture.machine();
        let mut actor = learned(&fixture, 9, &[SPIRIT_VISION]);
        let snapshot = actor.clone();
        assert_eq!(
            machine.deactivate(
                &mut actor,
                &id(SPIRIT_VISION),
                DeactivationReason::Manual,
                &mut NoEffects
            ),
            None
        );
        assert_eq!(actor, snapshot);
    }

    #[test]
    fn preset_cast_uses_active_page() {
        let fixture = Fixture::new();
        let machine = fixture.machine();
        let mut actor = learned(&fixture, 9, &[MIND_READ]);
        actor.ability.assign_preset(1, 4, id(MIND_READ)).unwrap();

        let empty = machine.cast_preset(&mut actor, 4, &CastContext::default(), &mut NoEffects);
        assert_eq!(empty, Err(CastRejection::EmptySlot { page: 0, slot: 4 }));

        actor.ability.set_active_page(1).unwrap();
        let outcome = machine
            .cast_preset(&mut actor, 4, &CastContext::default(), &mut NoEffects)
            .unwrap();
        assert_eq!(outcome.skill, id(MIND_READ));
        assert_eq!(
            machine.cast_preset(&mut actor, 99, &CastContext::default(), &mut NoEffects),
            Err(CastRejection::InvalidSlot { slot: 99 })
        );
    }

    #[test]
    fn active_set_stays_within_learned() {
        let fixture = Fixture::new();
        let machine = fixture.machine();
        let mut actor = learned(&fixture, 8, &[SPIRIT_VISION, DANGER_SENSE, MIND_READ, AIR_BULLET]);
        let script = [SPIRIT_VISION, MIND_READ, AIR_BULLET, SPIRIT_VISION, DANGER_SENSE];
        for (step, raw) in script.iter().cycle().take(40).enumerate() {
            let _ = machine.cast(&mut actor, &id(raw), &CastContext::default(), &mut NoEffects);
            if step % 7 == 3 {
                machine.forget(&mut actor, &id(raw), &mut NoEffects);
                machine.learn(&mut actor, &id(raw)).unwrap();
            }
            for _ in 0..5 {
                machine.tick(&mut actor, &mut NoEffects);
            }
            assert!(actor.ability.validate(&fixture.skills).is_ok());
            let max = actor.resource.max(&fixture.pathways);
            assert!((0.0..=max).contains(&actor.resource.current()));
        }
        assert_eq!(actor.tier(), Tier::new(8).unwrap());
    }
}
