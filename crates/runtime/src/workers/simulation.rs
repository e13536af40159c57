//! Simulation worker that owns the authoritative [`SimulationState`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), drives
//! them through [`GameEngine`], applies the hook actions collected along the
//! way and publishes events to the EventBus.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use beyonder_core::sync::SyncTracker;
use beyonder_core::{
    ActorFlags, ActorId, ActorState, Attributes, BlockPos, BlockScanStrategy, CastContext,
    CastOutcome, DivinationQuery, DivinationReport, EngineError, GameConfig, GameEngine, GameError,
    LoadReport, Notice, PathwayId, PerceptionBlob, Pose, SearchMode, SimulationState, SkillId,
    StepReport, ThreatLevel, Tier, WorldEntity,
};

use crate::api::{Result, RuntimeError};
use crate::events::{DivinationEvent, Event, EventBus, NoticeEvent, SyncEvent};
use crate::hooks::{EffectCollector, HookAction, HookFailure, HookRegistry};
use crate::oracle::{AttributeTable, GridWorld, OracleBundle};
use crate::repository::ActorRepository;

type Reply<T> = oneshot::Sender<Result<T>>;

/// Commands that can be sent to the simulation worker.
pub enum Command {
    Attach {
        actor: ActorId,
        flags: ActorFlags,
        reply: Reply<()>,
    },
    Remove {
        actor: ActorId,
        reply: Reply<()>,
    },
    /// Admin command: make the actor a Beyonder of a pathway at a tier.
    Initialize {
        actor: ActorId,
        pathway: PathwayId,
        tier: Tier,
        reply: Reply<Vec<Notice>>,
    },
    Cast {
        actor: ActorId,
        skill: SkillId,
        context: CastContext,
        reply: Reply<CastOutcome>,
    },
    CastPreset {
        actor: ActorId,
        slot: usize,
        context: CastContext,
        reply: Reply<CastOutcome>,
    },
    Learn {
        actor: ActorId,
        skill: SkillId,
        reply: Reply<Option<Notice>>,
    },
    Forget {
        actor: ActorId,
        skill: SkillId,
        reply: Reply<Option<Notice>>,
    },
    SetPassive {
        actor: ActorId,
        skill: SkillId,
        enabled: bool,
        reply: Reply<Option<Notice>>,
    },
    AssignPreset {
        actor: ActorId,
        page: usize,
        slot: usize,
        skill: Option<SkillId>,
        reply: Reply<()>,
    },
    SetPage {
        actor: ActorId,
        page: usize,
        reply: Reply<()>,
    },
    UpdatePose {
        actor: ActorId,
        pose: Option<Pose>,
        reply: Reply<()>,
    },
    UpdateAttributes {
        actor: ActorId,
        attributes: Option<Attributes>,
        reply: Reply<()>,
    },
    SetBlock {
        pos: BlockPos,
        kind: Option<String>,
        reply: Reply<()>,
    },
    SpawnEntity {
        entity: WorldEntity,
        reply: Reply<()>,
    },
    RemoveEntity {
        handle: u64,
        reply: Reply<bool>,
    },
    EnterCombat {
        actor: ActorId,
        reply: Reply<()>,
    },
    SetQuery {
        actor: ActorId,
        query: DivinationQuery,
        reply: Reply<()>,
    },
    ClearQuery {
        actor: ActorId,
        reply: Reply<Option<DivinationQuery>>,
    },
    Divine {
        actor: ActorId,
        mode: SearchMode,
        reply: Reply<DivinationReport>,
    },
    StopDivination {
        actor: ActorId,
        reply: Reply<bool>,
    },
    Respawn {
        actor: ActorId,
        reply: Reply<()>,
    },
    /// Advance the simulation by `ticks` ticks.
    Step {
        ticks: u32,
        reply: Reply<Vec<StepReport>>,
    },
    QueryActor {
        actor: ActorId,
        reply: Reply<Option<ActorState>>,
    },
    QueryTick {
        reply: Reply<u64>,
    },
    Perception {
        actor: ActorId,
        reply: Reply<PerceptionBlob>,
    },
    CanPerceive {
        observer: ActorId,
        target: ActorId,
        reply: Reply<bool>,
    },
    AssessThreat {
        observer: ActorId,
        target: ActorId,
        reply: Reply<ThreatLevel>,
    },
    Save {
        actor: ActorId,
        reply: Reply<()>,
    },
    Load {
        actor: ActorId,
        reply: Reply<LoadReport>,
    },
}

/// Everything the engine borrows for one command.
struct Simulation {
    state: SimulationState,
    oracles: OracleBundle,
    world: GridWorld,
    attributes: AttributeTable,
    config: GameConfig,
    scan: Box<dyn BlockScanStrategy>,
}

impl Simulation {
    fn engine(&mut self) -> GameEngine<'_> {
        let env = self.oracles.game_env(&self.attributes, &self.world);
        GameEngine::new(&mut self.state, env, &self.config, self.scan.as_ref())
    }
}

/// Inputs the builder hands to [`SimulationWorker::new`].
pub struct WorkerParts {
    pub state: SimulationState,
    pub oracles: OracleBundle,
    pub world: GridWorld,
    pub attributes: AttributeTable,
    pub config: GameConfig,
    pub scan: Box<dyn BlockScanStrategy>,
    pub hooks: HookRegistry,
    pub repository: Option<Arc<dyn ActorRepository>>,
    pub tick_interval: Option<Duration>,
}

/// Background task that processes gameplay commands.
///
/// The worker is the only owner of actor state. Hooks never mutate it
/// directly: their actions are collected during an engine call and applied
/// here once the call has returned.
pub struct SimulationWorker {
    sim: Simulation,
    hooks: HookRegistry,
    trackers: BTreeMap<ActorId, SyncTracker>,
    repository: Option<Arc<dyn ActorRepository>>,
    tick_interval: Option<Duration>,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl SimulationWorker {
    /// Creates a new simulation worker.
    pub fn new(parts: WorkerParts, command_rx: mpsc::Receiver<Command>, event_bus: EventBus) -> Self {
        info!(
            target: "runtime::worker",
            seed = parts.state.seed(),
            hooks = parts.hooks.len(),
            scan = ?parts.scan.kind(),
            persistent = parts.repository.is_some(),
            "SimulationWorker initialized"
        );

        let trackers = parts
            .state
            .actor_ids()
            .map(|id| {
                let mut tracker = SyncTracker::new();
                tracker.force();
                (id, tracker)
            })
            .collect();

        Self {
            sim: Simulation {
                state: parts.state,
                oracles: parts.oracles,
                world: parts.world,
                attributes: parts.attributes,
                config: parts.config,
                scan: parts.scan,
            },
            hooks: parts.hooks,
            trackers,
            repository: parts.repository,
            tick_interval: parts.tick_interval,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop.
    ///
    /// With a tick interval configured the worker also steps the simulation
    /// on its own; commands are handled between ticks.
    pub async fn run(mut self) {
        let mut ticker = self.tick_interval.map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = next_tick(ticker.as_mut()) => {
                    self.step_once();
                }
            }
        }

        debug!(target: "runtime::worker", "Command channel closed, worker stopping");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Attach {
                actor,
                flags,
                reply,
            } => {
                let result = self.attach(actor, flags);
                respond(reply, result, "Attach");
            }
            Command::Remove { actor, reply } => {
                let result = self.sim.engine().remove(actor).map(|_| ());
                if result.is_ok() {
                    self.trackers.remove(&actor);
                    debug!(target: "runtime::worker", %actor, "Actor removed");
                }
                respond(reply, result.map_err(Into::into), "Remove");
            }
            Command::Initialize {
                actor,
                pathway,
                tier,
                reply,
            } => {
                let result = self.initialize(actor, &pathway, tier);
                respond(reply, result, "Initialize");
            }
            Command::Cast {
                actor,
                skill,
                context,
                reply,
            } => {
                let result = self.with_hooks(|engine, effects| {
                    engine.cast(actor, &skill, &context, effects)
                });
                let result = self.outcome_notice(actor, result);
                respond(reply, result, "Cast");
            }
            Command::CastPreset {
                actor,
                slot,
                context,
                reply,
            } => {
                let result = self.with_hooks(|engine, effects| {
                    engine.cast_preset(actor, slot, &context, effects)
                });
                let result = self.outcome_notice(actor, result);
                respond(reply, result, "CastPreset");
            }
            Command::Learn {
                actor,
                skill,
                reply,
            } => {
                let result = self.sim.engine().learn(actor, &skill).map_err(Into::into);
                let result = self.optional_notice(actor, result);
                respond(reply, result, "Learn");
            }
            Command::Forget {
                actor,
                skill,
                reply,
            } => {
                let result = self.with_hooks(|engine, effects| engine.forget(actor, &skill, effects));
                let result = self.optional_notice(actor, result);
                respond(reply, result, "Forget");
            }
            Command::SetPassive {
                actor,
                skill,
                enabled,
                reply,
            } => {
                let result = self.with_hooks(|engine, effects| {
                    engine.set_passive(actor, &skill, enabled, effects)
                });
                let result = self.optional_notice(actor, result);
                respond(reply, result, "SetPassive");
            }
            Command::AssignPreset {
                actor,
                page,
                slot,
                skill,
                reply,
            } => {
                let result = self.sim.engine().assign_preset(actor, page, slot, skill);
                respond(reply, result.map_err(Into::into), "AssignPreset");
            }
            Command::SetPage { actor, page, reply } => {
                let result = self.sim.engine().set_page(actor, page);
                respond(reply, result.map_err(Into::into), "SetPage");
            }
            Command::UpdatePose { actor, pose, reply } => {
                self.sim.world.set_pose(actor, pose);
                respond(reply, Ok(()), "UpdatePose");
            }
            Command::UpdateAttributes {
                actor,
                attributes,
                reply,
            } => {
                match attributes {
                    Some(attributes) => {
                        self.sim.attributes.set(actor, attributes);
                    }
                    None => {
                        self.sim.attributes.remove(actor);
                    }
                }
                respond(reply, Ok(()), "UpdateAttributes");
            }
            Command::SetBlock { pos, kind, reply } => {
                self.sim.world.set_block(pos, kind);
                respond(reply, Ok(()), "SetBlock");
            }
            Command::SpawnEntity { entity, reply } => {
                self.sim.world.spawn(entity);
                respond(reply, Ok(()), "SpawnEntity");
            }
            Command::RemoveEntity { handle, reply } => {
                let removed = self.sim.world.despawn(handle).is_some();
                respond(reply, Ok(removed), "RemoveEntity");
            }
            Command::EnterCombat { actor, reply } => {
                let result = self.sim.engine().enter_combat(actor);
                respond(reply, result.map_err(Into::into), "EnterCombat");
            }
            Command::SetQuery {
                actor,
                query,
                reply,
            } => {
                let result = self.sim.engine().set_query(actor, query);
                respond(reply, result.map_err(Into::into), "SetQuery");
            }
            Command::ClearQuery { actor, reply } => {
                let result = self.sim.engine().clear_query(actor);
                respond(reply, result.map_err(Into::into), "ClearQuery");
            }
            Command::Divine { actor, mode, reply } => {
                let result = self.divine(actor, mode);
                respond(reply, result.map_err(Into::into), "Divine");
            }
            Command::StopDivination { actor, reply } => {
                let stopped = self.sim.engine().stop_divination(actor);
                respond(reply, Ok(stopped), "StopDivination");
            }
            Command::Respawn { actor, reply } => {
                let result = self.sim.engine().respawn(actor).map(|_| ());
                if result.is_ok() {
                    self.force_sync(actor);
                }
                respond(reply, result.map_err(Into::into), "Respawn");
            }
            Command::Step { ticks, reply } => {
                let reports = (0..ticks).filter_map(|_| self.step_once()).collect();
                respond(reply, Ok(reports), "Step");
            }
            Command::QueryActor { actor, reply } => {
                let actor = self.sim.state.actor(actor).cloned();
                respond(reply, Ok(actor), "QueryActor");
            }
            Command::QueryTick { reply } => {
                respond(reply, Ok(self.sim.state.tick()), "QueryTick");
            }
            Command::Perception { actor, reply } => {
                let result = self.sim.engine().perception_blob(actor);
                respond(reply, result.map_err(Into::into), "Perception");
            }
            Command::CanPerceive {
                observer,
                target,
                reply,
            } => {
                let result = self.sim.engine().can_perceive(observer, target);
                respond(reply, result.map_err(Into::into), "CanPerceive");
            }
            Command::AssessThreat {
                observer,
                target,
                reply,
            } => {
                let result = self.sim.engine().assess_threat(observer, target);
                respond(reply, result.map_err(Into::into), "AssessThreat");
            }
            Command::Save { actor, reply } => {
                let result = self.save(actor);
                respond(reply, result, "Save");
            }
            Command::Load { actor, reply } => {
                let result = self.load(actor);
                respond(reply, result, "Load");
            }
        }

        self.flush_sync();
    }

    fn attach(&mut self, actor: ActorId, flags: ActorFlags) -> Result<()> {
        self.sim.engine().attach(actor, flags)?;
        self.force_sync(actor);
        debug!(target: "runtime::worker", %actor, ?flags, "Actor attached");
        Ok(())
    }

    fn initialize(&mut self, actor: ActorId, pathway: &PathwayId, tier: Tier) -> Result<Vec<Notice>> {
        let notices = self.sim.engine().initialize(actor, pathway, tier)?;
        self.force_sync(actor);
        for notice in &notices {
            self.publish_notice(actor, notice.clone());
        }
        info!(
            target: "runtime::worker",
            %actor,
            %pathway,
            %tier,
            learned = notices.len(),
            "Actor initialized"
        );
        Ok(notices)
    }

    fn save(&mut self, actor: ActorId) -> Result<()> {
        let repository = self.repository.as_ref().ok_or(RuntimeError::NoRepository)?;
        let snapshot = self.sim.engine().snapshot(actor)?;
        repository.save(actor, &snapshot)?;
        Ok(())
    }

    fn load(&mut self, actor: ActorId) -> Result<LoadReport> {
        let repository = self.repository.as_ref().ok_or(RuntimeError::NoRepository)?;
        let saved = repository
            .load(actor)?
            .ok_or(RuntimeError::SaveNotFound(actor))?;
        let report = self.sim.engine().restore(&saved)?;
        if !report.is_clean() {
            warn!(
                target: "runtime::worker",
                %actor,
                learned = report.learned,
                cooldowns = report.cooldowns,
                active = report.active,
                presets = report.presets,
                fields = report.fields,
                "Dropped entries while restoring save"
            );
        }
        self.force_sync(actor);
        Ok(report)
    }

    /// Runs an engine call with a hook collector, then applies what the
    /// hooks asked for.
    ///
    /// A critical hook failure turns a successful call into an error; the
    /// call's state changes are kept.
    fn with_hooks<T>(
        &mut self,
        call: impl FnOnce(&mut GameEngine<'_>, &mut EffectCollector<'_>) -> std::result::Result<T, EngineError>,
    ) -> Result<T> {
        let (result, failure) = self.run_hooked(call);
        let value = result?;
        match failure {
            Some(HookFailure { hook, error }) => Err(RuntimeError::HookFailed { hook, error }),
            None => Ok(value),
        }
    }

    fn run_hooked<T>(
        &mut self,
        call: impl FnOnce(&mut GameEngine<'_>, &mut EffectCollector<'_>) -> std::result::Result<T, EngineError>,
    ) -> (std::result::Result<T, EngineError>, Option<HookFailure>) {
        let mut collector = EffectCollector::new(&self.hooks);
        let result = {
            let mut engine = self.sim.engine();
            call(&mut engine, &mut collector)
        };
        let (actions, failure) = collector.finish();
        self.apply_actions(actions);
        (result, failure)
    }

    fn apply_actions(&mut self, actions: Vec<HookAction>) {
        for action in actions {
            match action {
                HookAction::EnterCombat(actor) => {
                    if let Err(e) = self.sim.engine().enter_combat(actor) {
                        debug!(target: "runtime::worker", %actor, error = %e, "Combat target is not attached");
                    }
                }
                HookAction::Divine { actor, mode } => {
                    // Failures are published as interruptions.
                    let _ = self.divine(actor, mode);
                }
                HookAction::Publish(event) => {
                    self.event_bus.publish(Event::Effect(event));
                }
            }
        }
    }

    /// Runs a search and publishes its outcome either way.
    fn divine(
        &mut self,
        actor: ActorId,
        mode: SearchMode,
    ) -> std::result::Result<DivinationReport, EngineError> {
        let tick = self.sim.state.tick();
        let result = self.sim.engine().divine(actor, mode);
        match &result {
            Ok(report) => {
                debug!(
                    target: "runtime::worker",
                    %actor,
                    ?mode,
                    result = ?report.result,
                    "Divination finished"
                );
                self.event_bus.publish(Event::Divination(DivinationEvent::Report {
                    actor,
                    tick,
                    report: report.clone(),
                }));
            }
            Err(e) => self.publish_interrupted(actor, tick, e),
        }
        result
    }

    /// Advances one tick. Returns `None` only if the engine refused to step.
    fn step_once(&mut self) -> Option<StepReport> {
        let (result, _failure) = self.run_hooked(|engine, effects| engine.step(effects));
        let report = match result {
            Ok(report) => report,
            Err(e) => {
                warn!(target: "runtime::worker", error = %e, code = e.error_code(), "Step failed");
                return None;
            }
        };

        for (actor, notice) in &report.notices {
            self.publish_notice(*actor, notice.clone());
        }
        for alert in &report.alerts {
            self.event_bus.publish(Event::Alert(*alert));
        }
        for (actor, divination) in &report.divinations {
            self.event_bus.publish(Event::Divination(DivinationEvent::Report {
                actor: *actor,
                tick: report.tick,
                report: divination.clone(),
            }));
        }
        for (actor, error) in &report.interrupted {
            self.publish_interrupted(*actor, report.tick, error);
        }

        for tracker in self.trackers.values_mut() {
            tracker.advance();
        }
        self.flush_sync();
        Some(report)
    }

    fn outcome_notice(
        &mut self,
        actor: ActorId,
        result: Result<CastOutcome>,
    ) -> Result<CastOutcome> {
        if let Ok(outcome) = &result
            && let Some(notice) = &outcome.notice
        {
            self.publish_notice(actor, notice.clone());
        }
        result
    }

    fn optional_notice(
        &mut self,
        actor: ActorId,
        result: Result<Option<Notice>>,
    ) -> Result<Option<Notice>> {
        if let Ok(Some(notice)) = &result {
            self.publish_notice(actor, notice.clone());
        }
        result
    }

    fn publish_notice(&self, actor: ActorId, notice: Notice) {
        self.event_bus.publish(Event::Notice(NoticeEvent {
            actor,
            tick: self.sim.state.tick(),
            notice,
        }));
    }

    fn publish_interrupted(&self, actor: ActorId, tick: u64, error: &EngineError) {
        debug!(target: "runtime::worker", %actor, error = %error, "Divination interrupted");
        self.event_bus
            .publish(Event::Divination(DivinationEvent::Interrupted {
                actor,
                tick,
                code: error.error_code().to_owned(),
                message: error.to_string(),
            }));
    }

    fn force_sync(&mut self, actor: ActorId) {
        self.trackers.entry(actor).or_default().force();
    }

    /// Publishes a sync event for every actor whose tracker asks for one.
    fn flush_sync(&mut self) {
        let tick = self.sim.state.tick();
        for (id, tracker) in self.trackers.iter_mut() {
            let Some(actor) = self.sim.state.actor(*id) else {
                continue;
            };
            if let Some(push) = tracker.poll(actor, self.sim.state.gaze(), &self.sim.config) {
                self.event_bus.publish(Event::Sync(SyncEvent {
                    actor: *id,
                    tick,
                    push,
                }));
            }
        }
    }
}

async fn next_tick(ticker: Option<&mut tokio::time::Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn respond<T>(reply: Reply<T>, result: Result<T>, command: &'static str) {
    if let Err(e) = &result {
        debug!(target: "runtime::worker", command, error = %e, "Command failed");
    }
    if reply.send(result).is_err() {
        debug!(target: "runtime::worker", command, "Reply channel closed (caller dropped)");
    }
}
