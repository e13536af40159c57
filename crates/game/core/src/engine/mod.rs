//! The authoritative simulation step and command surface.
//!
//! [`GameEngine`] borrows a [`SimulationState`] together with the oracles
//! for the duration of one command. Every mutation of actor state, gaze
//! trackers and running searches goes through it; the skill machine, the
//! perception evaluators and the divination search stay stateless.

mod errors;
mod simulation;

pub use errors::EngineError;
pub use simulation::SimulationState;

use crate::config::GameConfig;
use crate::divination::{
    BlockScanStrategy, DivinationQuery, DivinationReport, DivinationSearch, Diviner, SearchMode,
};
use crate::env::GameEnv;
use crate::perception::{
    DangerSense, GazeAlert, PerceptionEvaluator, ThreatLevel, ThreatObserver, ThreatSubject,
    evaluate,
};
use crate::skill::{CastContext, CastMachine, CastOutcome, Notice, SkillEffects};
use crate::state::{ActorFlags, ActorId, ActorState, PathwayId, SkillId, Tier};
use crate::sync::{LoadReport, PerceptionBlob, PersistedActor};

/// Everything that happened during one [`GameEngine::step`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepReport {
    pub tick: u64,
    pub notices: Vec<(ActorId, Notice)>,
    pub alerts: Vec<GazeAlert>,
    pub divinations: Vec<(ActorId, DivinationReport)>,
    /// Continuous searches that ended this tick without a report.
    pub interrupted: Vec<(ActorId, EngineError)>,
}

pub struct GameEngine<'a> {
    state: &'a mut SimulationState,
    env: GameEnv<'a>,
    config: &'a GameConfig,
    scan: &'a dyn BlockScanStrategy,
}

impl<'a> GameEngine<'a> {
    pub fn new(
        state: &'a mut SimulationState,
        env: GameEnv<'a>,
        config: &'a GameConfig,
        scan: &'a dyn BlockScanStrategy,
    ) -> Self {
        Self {
            state,
            env,
            config,
            scan,
        }
    }

    pub fn state(&self) -> &SimulationState {
        self.state
    }

    fn machine(&self) -> Result<CastMachine<'a>, EngineError> {
        Ok(CastMachine::from_env(&self.env, self.config)?)
    }

    pub fn actor(&self, id: ActorId) -> Result<&ActorState, EngineError> {
        self.state
            .actors
            .get(&id)
            .ok_or(EngineError::UnknownActor(id))
    }

    fn actor_mut(&mut self, id: ActorId) -> Result<&mut ActorState, EngineError> {
        self.state
            .actors
            .get_mut(&id)
            .ok_or(EngineError::UnknownActor(id))
    }

    // ===== lifecycle =====

    pub fn attach(&mut self, id: ActorId, flags: ActorFlags) -> Result<&ActorState, EngineError> {
        if self.state.actors.contains_key(&id) {
            return Err(EngineError::ActorExists(id));
        }
        Ok(self
            .state
            .actors
            .entry(id)
            .or_insert_with(|| ActorState::new(id).with_flags(flags)))
    }

    /// Detaches an actor and evicts every gaze pair that references it.
    pub fn remove(&mut self, id: ActorId) -> Result<ActorState, EngineError> {
        let actor = self
            .state
            .actors
            .remove(&id)
            .ok_or(EngineError::UnknownActor(id))?;
        self.state.gaze.evict(id);
        self.state.searching.remove(&id);
        Ok(actor)
    }

    /// Admin command: makes the actor a Beyonder of `pathway` at `tier`.
    ///
    /// Refuses unknown pathways before touching anything. Otherwise sets
    /// the progression, refills the pool and learns every skill listed at
    /// `tier` or any weaker tier.
    pub fn initialize(
        &mut self,
        id: ActorId,
        pathway: &PathwayId,
        tier: Tier,
    ) -> Result<Vec<Notice>, EngineError> {
        let progression = self.env.progression()?;
        let machine = self.machine()?;
        self.actor(id)?;
        let definition = progression
            .pathway(pathway)
            .ok_or_else(|| EngineError::UnknownPathway(pathway.clone()))?;

        let actor = self.actor_mut(id)?;
        actor.resource.set_progression(Some(pathway.clone()), tier);
        actor.resource.fill(progression);
        actor.flags |= ActorFlags::BEYONDER;

        let mut notices = Vec::new();
        for skill in definition.skills_unlocked_at(tier) {
            if let Some(notice) = machine.learn(actor, &skill)? {
                notices.push(notice);
            }
        }
        Ok(notices)
    }

    /// Snapshot-and-replace for respawn or realm transfer.
    ///
    /// Cooldowns, combat and running searches are dropped; only passives
    /// stay active.
    pub fn respawn(&mut self, id: ActorId) -> Result<&ActorState, EngineError> {
        let skills = self.env.skills()?;
        let previous = self.actor(id)?.clone();
        let mut fresh = ActorState::new(id);
        fresh.copy_from(&previous, skills);
        self.state.gaze.evict(id);
        self.state.searching.remove(&id);
        let slot = self.actor_mut(id)?;
        *slot = fresh;
        Ok(slot)
    }

    pub fn snapshot(&self, id: ActorId) -> Result<PersistedActor, EngineError> {
        Ok(PersistedActor::capture(self.actor(id)?))
    }

    /// Restores a save, attaching the actor or replacing it.
    pub fn restore(&mut self, saved: &PersistedActor) -> Result<LoadReport, EngineError> {
        let (actor, report) = saved.restore(self.env.skills()?, self.env.progression()?)?;
        let id = actor.id;
        self.state.gaze.evict(id);
        self.state.searching.remove(&id);
        self.state.actors.insert(id, actor);
        Ok(report)
    }

    // ===== skills =====

    pub fn cast(
        &mut self,
        id: ActorId,
        skill: &SkillId,
        context: &CastContext,
        effects: &mut dyn SkillEffects,
    ) -> Result<CastOutcome, EngineError> {
        let machine = self.machine()?;
        Ok(machine.cast(self.actor_mut(id)?, skill, context, effects)?)
    }

    pub fn cast_preset(
        &mut self,
        id: ActorId,
        slot: usize,
        context: &CastContext,
        effects: &mut dyn SkillEffects,
    ) -> Result<CastOutcome, EngineError> {
        let machine = self.machine()?;
        Ok(machine.cast_preset(self.actor_mut(id)?, slot, context, effects)?)
    }

    pub fn learn(&mut self, id: ActorId, skill: &SkillId) -> Result<Option<Notice>, EngineError> {
        let machine = self.machine()?;
        Ok(machine.learn(self.actor_mut(id)?, skill)?)
    }

    pub fn forget(
        &mut self,
        id: ActorId,
        skill: &SkillId,
        effects: &mut dyn SkillEffects,
    ) -> Result<Option<Notice>, EngineError> {
        let machine = self.machine()?;
        Ok(machine.forget(self.actor_mut(id)?, skill, effects))
    }

    pub fn set_passive(
        &mut self,
        id: ActorId,
        skill: &SkillId,
        enabled: bool,
        effects: &mut dyn SkillEffects,
    ) -> Result<Option<Notice>, EngineError> {
        let machine = self.machine()?;
        Ok(machine.set_passive_enabled(self.actor_mut(id)?, skill, enabled, effects)?)
    }

    /// Binds `skill` to a slot, or clears the slot when `skill` is `None`.
    pub fn assign_preset(
        &mut self,
        id: ActorId,
        page: usize,
        slot: usize,
        skill: Option<SkillId>,
    ) -> Result<(), EngineError> {
        let ability = &mut self.actor_mut(id)?.ability;
        match skill {
            Some(skill) => ability.assign_preset(page, slot, skill)?,
            None => {
                ability.clear_preset(page, slot)?;
            }
        }
        Ok(())
    }

    pub fn set_page(&mut self, id: ActorId, page: usize) -> Result<(), EngineError> {
        Ok(self.actor_mut(id)?.ability.set_active_page(page)?)
    }

    pub fn enter_combat(&mut self, id: ActorId) -> Result<(), EngineError> {
        self.actor_mut(id)?.resource.enter_combat();
        Ok(())
    }

    // ===== perception =====

    pub fn can_perceive(&self, observer: ActorId, target: ActorId) -> Result<bool, EngineError> {
        let evaluator = PerceptionEvaluator::from_env(&self.env, self.config)?;
        Ok(evaluator.can_perceive(self.actor(observer)?, self.actor(target)?))
    }

    pub fn assess_threat(
        &self,
        observer: ActorId,
        target: ActorId,
    ) -> Result<ThreatLevel, EngineError> {
        let attributes = self.env.attributes()?;
        let observer_state = self.actor(observer)?;
        let target_state = self.actor(target)?;
        let observer = ThreatObserver {
            id: observer,
            tier: observer_state.beyonder_tier(),
            team: attributes.attributes(observer).and_then(|a| a.team),
        };
        let subject = ThreatSubject {
            tier: target_state.beyonder_tier(),
            attributes: attributes.attributes(target).unwrap_or_default(),
        };
        Ok(evaluate(&observer, &subject))
    }

    pub fn perception_blob(&self, id: ActorId) -> Result<PerceptionBlob, EngineError> {
        Ok(PerceptionBlob::capture(self.actor(id)?, &self.state.gaze))
    }

    // ===== divination =====

    pub fn set_query(&mut self, id: ActorId, query: DivinationQuery) -> Result<(), EngineError> {
        self.actor_mut(id)?.carrier.set_query(query);
        Ok(())
    }

    /// Clears the query and stops any continuous search.
    pub fn clear_query(&mut self, id: ActorId) -> Result<Option<DivinationQuery>, EngineError> {
        let query = self.actor_mut(id)?.carrier.clear();
        self.state.searching.remove(&id);
        Ok(query)
    }

    /// Runs one search with the actor's carrier query and applies mastery.
    ///
    /// In continuous mode a report that does not stop keeps the search
    /// scheduled for every divination interval; a stopping one ends it.
    pub fn divine(&mut self, id: ActorId, mode: SearchMode) -> Result<DivinationReport, EngineError> {
        let world = self.env.world()?;
        let rng = self.env.rng()?;
        let actor = self.actor(id)?;
        let query = actor
            .carrier
            .query()
            .cloned()
            .ok_or(EngineError::NoDivinationQuery(id))?;
        let pose = world.pose(id).ok_or(EngineError::NoPose(id))?;
        let diviner = Diviner {
            actor: id,
            origin: pose.position,
            tier: actor.tier(),
            mastery: actor.mastery(),
        };

        let search = DivinationSearch::new(world, rng, self.scan, self.config, self.state.seed);
        let report = search.search(&diviner, &query, mode, self.state.tick);
        self.actor_mut(id)?.add_mastery(report.mastery_gain);
        if mode == SearchMode::Continuous {
            if report.stop {
                self.state.searching.remove(&id);
            } else {
                self.state.searching.insert(id);
            }
        }
        Ok(report)
    }

    /// Returns whether a continuous search was running.
    pub fn stop_divination(&mut self, id: ActorId) -> bool {
        self.state.searching.remove(&id)
    }

    // ===== tick =====

    /// Advances the simulation by one tick.
    ///
    /// Every actor ticks in id order; danger sense and continuous searches
    /// run on their own cadence afterwards.
    pub fn step(&mut self, effects: &mut dyn SkillEffects) -> Result<StepReport, EngineError> {
        let machine = self.machine()?;
        self.state.tick += 1;
        let tick = self.state.tick;
        let mut report = StepReport {
            tick,
            ..StepReport::default()
        };

        for actor in self.state.actors.values_mut() {
            let ticked = machine.tick(actor, effects);
            report
                .notices
                .extend(ticked.notices.into_iter().map(|notice| (actor.id, notice)));
        }

        let danger_interval = self.config.danger_sense_interval.max(1);
        if tick % u64::from(danger_interval) == 0 {
            let sense = DangerSense::from_env(&self.env, self.config)?;
            report.alerts = sense.pass(
                &self.state.actors,
                &mut self.state.gaze,
                tick,
                danger_interval,
            );
        }

        let divination_interval = u64::from(self.config.divination_interval.max(1));
        if tick % divination_interval == 0 {
            let searching: Vec<ActorId> = self.state.searching.iter().copied().collect();
            for id in searching {
                match self.divine(id, SearchMode::Continuous) {
                    Ok(divination) => report.divinations.push((id, divination)),
                    Err(error) => {
                        self.state.searching.remove(&id);
                        report.interrupted.push((id, error));
                    }
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::divination::{DivinationResult, GridScan};
    use crate::env::{Env, GameEnv, Pose, PcgRng};
    use crate::geometry::{BlockPos, Vec3};
    use crate::skill::NoEffects;
    use crate::state::PathwayId;
    use crate::testing::{
        DANGER_SENSE, MIND_READ, SPIRIT_VISION, TestAttributes, TestWorld, id, pathways, seer,
        skills,
    };

    struct Fixture {
        skills: crate::env::SkillRegistry,
        pathways: crate::env::PathwayRegistry,
        attributes: TestAttributes,
        world: TestWorld,
        rng: PcgRng,
        config: GameConfig,
        state: SimulationState,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                skills: skills(),
                pathways: pathways(),
                attributes: TestAttributes::default(),
                world: TestWorld::default(),
                rng: PcgRng,
                config: GameConfig::default(),
                state: SimulationState::new(42),
            }
        }

        fn engine(&mut self) -> GameEngine<'_> {
            let env: GameEnv<'_> = Env::with_all(
                &self.skills,
                &self.pathways,
                &self.attributes,
                &self.world,
                &self.rng,
            )
            .into_game_env();
            GameEngine::new(&mut self.state, env, &self.config, &GridScan)
        }
    }

    fn tier(value: u8) -> Tier {
        Tier::new(value).unwrap()
    }

    #[test]
    fn attach_twice_is_refused() {
        let mut fixture = Fixture::new();
        let mut engine = fixture.engine();
        engine.attach(ActorId(1), ActorFlags::empty()).unwrap();
        assert_eq!(
            engine.attach(ActorId(1), ActorFlags::empty()).unwrap_err(),
            EngineError::ActorExists(ActorId(1))
        );
    }

    #[test]
    fn initialize_learns_everything_up_to_tier() {
        let mut fixture = Fixture::new();
        let mut engine = fixture.engine();
        engine.attach(ActorId(1), ActorFlags::empty()).unwrap();

        let notices = engine.initialize(ActorId(1), &seer(), tier(8)).unwrap();
        assert_eq!(notices.len(), 3);
        let actor = engine.actor(ActorId(1)).unwrap();
        assert!(actor.is_beyonder());
        assert_eq!(actor.resource.current(), 180.0);
        for raw in [SPIRIT_VISION, MIND_READ, DANGER_SENSE] {
            assert!(actor.ability.is_learned(&id(raw)));
        }
        assert!(actor.ability.is_active(&id(DANGER_SENSE)));
    }

    #[test]
    fn unknown_pathway_changes_nothing() {
        let mut fixture = Fixture::new();
        let mut engine = fixture.engine();
        engine.attach(ActorId(1), ActorFlags::empty()).unwrap();
        let before = engine.actor(ActorId(1)).unwrap().clone();

        let unknown = PathwayId::new("lotm:sun").unwrap();
        assert_eq!(
            engine.initialize(ActorId(1), &unknown, tier(9)).unwrap_err(),
            EngineError::UnknownPathway(unknown)
        );
        assert_eq!(engine.actor(ActorId(1)).unwrap(), &before);
    }

    #[test]
    fn step_raises_gaze_alerts_and_remove_evicts_pairs() {
        let mut fixture = Fixture::new();
        fixture
            .world
            .set_pose(ActorId(1), Pose::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0)));
        fixture
            .world
            .set_pose(ActorId(2), Pose::new(Vec3::new(0.0, 0.0, 10.0), Vec3::UP));
        let mut engine = fixture.engine();
        engine.attach(ActorId(1), ActorFlags::empty()).unwrap();
        engine.attach(ActorId(2), ActorFlags::empty()).unwrap();
        engine.initialize(ActorId(2), &seer(), tier(8)).unwrap();

        let mut alerts = Vec::new();
        for _ in 0..100 {
            alerts.extend(engine.step(&mut NoEffects).unwrap().alerts);
        }
        // seer tier 8 needs 90 ticks of gaze
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].tick, 90);
        assert!(!engine.state().gaze().is_empty());

        engine.remove(ActorId(1)).unwrap();
        assert!(engine.state().gaze().is_empty());
    }

    #[test]
    fn continuous_search_stops_when_target_is_gone() {
        let mut fixture = Fixture::new();
        fixture
            .world
            .set_pose(ActorId(1), Pose::new(Vec3::new(0.5, 0.0, 0.5), Vec3::UP));
        fixture
            .world
            .set_block(BlockPos::new(4, 0, 0), "minecraft:gold_ore");
        let mut engine = fixture.engine();
        engine.attach(ActorId(1), ActorFlags::empty()).unwrap();
        engine.initialize(ActorId(1), &seer(), tier(7)).unwrap();
        engine
            .set_query(ActorId(1), DivinationQuery::block("minecraft:gold_ore"))
            .unwrap();

        let first = engine.divine(ActorId(1), SearchMode::Continuous).unwrap();
        assert!(matches!(first.result, DivinationResult::Found { .. }));
        assert!(engine.state().is_searching(ActorId(1)));

        let mut reports = Vec::new();
        for _ in 0..40 {
            reports.extend(engine.step(&mut NoEffects).unwrap().divinations);
        }
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|(_, r)| !r.stop));

        engine
            .set_query(ActorId(1), DivinationQuery::block("minecraft:ancient_debris"))
            .unwrap();
        let mut last = Vec::new();
        for _ in 0..20 {
            last.extend(engine.step(&mut NoEffects).unwrap().divinations);
        }
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].1.result, DivinationResult::NotFound);
        assert!(!engine.state().is_searching(ActorId(1)));
    }

    #[test]
    fn divining_without_query_or_pose_fails() {
        let mut fixture = Fixture::new();
        let mut engine = fixture.engine();
        engine.attach(ActorId(1), ActorFlags::BEYONDER).unwrap();
        assert_eq!(
            engine.divine(ActorId(1), SearchMode::Single).unwrap_err(),
            EngineError::NoDivinationQuery(ActorId(1))
        );
        engine
            .set_query(ActorId(1), DivinationQuery::entity("minecraft:zombie"))
            .unwrap();
        assert_eq!(
            engine.divine(ActorId(1), SearchMode::Single).unwrap_err(),
            EngineError::NoPose(ActorId(1))
        );
    }

    #[test]
    fn respawn_keeps_knowledge_and_drops_transient_state() {
        let mut fixture = Fixture::new();
        let mut engine = fixture.engine();
        engine.attach(ActorId(1), ActorFlags::empty()).unwrap();
        engine.initialize(ActorId(1), &seer(), tier(9)).unwrap();
        engine.learn(ActorId(1), &id(DANGER_SENSE)).unwrap();
        engine
            .cast(
                ActorId(1),
                &id(SPIRIT_VISION),
                &CastContext::default(),
                &mut NoEffects,
            )
            .unwrap();
        engine.enter_combat(ActorId(1)).unwrap();

        let actor = engine.respawn(ActorId(1)).unwrap();
        assert!(actor.is_beyonder());
        assert!(actor.ability.is_learned(&id(SPIRIT_VISION)));
        assert!(!actor.ability.is_active(&id(SPIRIT_VISION)));
        assert!(actor.ability.is_active(&id(DANGER_SENSE)));
        assert_eq!(actor.ability.cooldowns().count(), 0);
        assert!(!actor.resource.in_combat());
    }

    #[test]
    fn snapshot_restore_replaces_actor() {
        let mut fixture = Fixture::new();
        let mut engine = fixture.engine();
        engine.attach(ActorId(3), ActorFlags::empty()).unwrap();
        engine.initialize(ActorId(3), &seer(), tier(9)).unwrap();
        let saved = engine.snapshot(ActorId(3)).unwrap();

        engine.remove(ActorId(3)).unwrap();
        let report = engine.restore(&saved).unwrap();
        assert!(report.is_clean());
        assert_eq!(engine.snapshot(ActorId(3)).unwrap(), saved);
    }
}
