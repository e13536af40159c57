//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! every simulation command, plus topic subscriptions on the event bus.
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};

use beyonder_core::{
    ActorFlags, ActorId, ActorState, Attributes, BlockPos, CastContext, CastOutcome,
    DivinationQuery, DivinationReport, LoadReport, Notice, PathwayId, PerceptionBlob, Pose,
    SearchMode, SkillId, StepReport, ThreatLevel, Tier, WorldEntity,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    /// Sends a command and waits for the worker's reply.
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    // ===== lifecycle =====

    pub async fn attach(&self, actor: ActorId, flags: ActorFlags) -> Result<()> {
        self.request(|reply| Command::Attach {
            actor,
            flags,
            reply,
        })
        .await
    }

    pub async fn remove(&self, actor: ActorId) -> Result<()> {
        self.request(|reply| Command::Remove { actor, reply }).await
    }

    /// Makes the actor a Beyonder of `pathway` at `tier` and learns every
    /// skill unlocked at that tier or weaker.
    pub async fn initialize(
        &self,
        actor: ActorId,
        pathway: PathwayId,
        tier: Tier,
    ) -> Result<Vec<Notice>> {
        self.request(|reply| Command::Initialize {
            actor,
            pathway,
            tier,
            reply,
        })
        .await
    }

    /// Replaces the actor with a fresh copy (respawn or realm transfer).
    pub async fn respawn(&self, actor: ActorId) -> Result<()> {
        self.request(|reply| Command::Respawn { actor, reply }).await
    }

    // ===== skills =====

    pub async fn cast(
        &self,
        actor: ActorId,
        skill: SkillId,
        context: CastContext,
    ) -> Result<CastOutcome> {
        self.request(|reply| Command::Cast {
            actor,
            skill,
            context,
            reply,
        })
        .await
    }

    /// Casts whatever is bound to `slot` on the active preset page.
    pub async fn cast_preset(
        &self,
        actor: ActorId,
        slot: usize,
        context: CastContext,
    ) -> Result<CastOutcome> {
        self.request(|reply| Command::CastPreset {
            actor,
            slot,
            context,
            reply,
        })
        .await
    }

    pub async fn learn(&self, actor: ActorId, skill: SkillId) -> Result<Option<Notice>> {
        self.request(|reply| Command::Learn {
            actor,
            skill,
            reply,
        })
        .await
    }

    pub async fn forget(&self, actor: ActorId, skill: SkillId) -> Result<Option<Notice>> {
        self.request(|reply| Command::Forget {
            actor,
            skill,
            reply,
        })
        .await
    }

    pub async fn set_passive(
        &self,
        actor: ActorId,
        skill: SkillId,
        enabled: bool,
    ) -> Result<Option<Notice>> {
        self.request(|reply| Command::SetPassive {
            actor,
            skill,
            enabled,
            reply,
        })
        .await
    }

    /// Binds `skill` to a preset slot, or clears the slot with `None`.
    pub async fn assign_preset(
        &self,
        actor: ActorId,
        page: usize,
        slot: usize,
        skill: Option<SkillId>,
    ) -> Result<()> {
        self.request(|reply| Command::AssignPreset {
            actor,
            page,
            slot,
            skill,
            reply,
        })
        .await
    }

    pub async fn set_page(&self, actor: ActorId, page: usize) -> Result<()> {
        self.request(|reply| Command::SetPage { actor, page, reply })
            .await
    }

    pub async fn enter_combat(&self, actor: ActorId) -> Result<()> {
        self.request(|reply| Command::EnterCombat { actor, reply })
            .await
    }

    // ===== world =====

    /// Moves the actor, or takes it out of the world with `None`.
    pub async fn update_pose(&self, actor: ActorId, pose: Option<Pose>) -> Result<()> {
        self.request(|reply| Command::UpdatePose { actor, pose, reply })
            .await
    }

    pub async fn update_attributes(
        &self,
        actor: ActorId,
        attributes: Option<Attributes>,
    ) -> Result<()> {
        self.request(|reply| Command::UpdateAttributes {
            actor,
            attributes,
            reply,
        })
        .await
    }

    /// Places a block, or clears it to air with `None`.
    pub async fn set_block(&self, pos: BlockPos, kind: Option<String>) -> Result<()> {
        self.request(|reply| Command::SetBlock { pos, kind, reply })
            .await
    }

    pub async fn spawn_entity(&self, entity: WorldEntity) -> Result<()> {
        self.request(|reply| Command::SpawnEntity { entity, reply })
            .await
    }

    /// Returns whether an entity with `handle` existed.
    pub async fn remove_entity(&self, handle: u64) -> Result<bool> {
        self.request(|reply| Command::RemoveEntity { handle, reply })
            .await
    }

    // ===== divination =====

    pub async fn set_query(&self, actor: ActorId, query: DivinationQuery) -> Result<()> {
        self.request(|reply| Command::SetQuery {
            actor,
            query,
            reply,
        })
        .await
    }

    pub async fn clear_query(&self, actor: ActorId) -> Result<Option<DivinationQuery>> {
        self.request(|reply| Command::ClearQuery { actor, reply })
            .await
    }

    pub async fn divine(&self, actor: ActorId, mode: SearchMode) -> Result<DivinationReport> {
        self.request(|reply| Command::Divine { actor, mode, reply })
            .await
    }

    /// Returns whether a continuous search was running.
    pub async fn stop_divination(&self, actor: ActorId) -> Result<bool> {
        self.request(|reply| Command::StopDivination { actor, reply })
            .await
    }

    // ===== simulation =====

    /// Advances the simulation by `ticks` ticks and returns one report per tick.
    pub async fn step(&self, ticks: u32) -> Result<Vec<StepReport>> {
        self.request(|reply| Command::Step { ticks, reply }).await
    }

    /// Query one actor (read-only snapshot).
    pub async fn query_actor(&self, actor: ActorId) -> Result<Option<ActorState>> {
        self.request(|reply| Command::QueryActor { actor, reply })
            .await
    }

    pub async fn current_tick(&self) -> Result<u64> {
        self.request(|reply| Command::QueryTick { reply }).await
    }

    pub async fn perception(&self, actor: ActorId) -> Result<PerceptionBlob> {
        self.request(|reply| Command::Perception { actor, reply })
            .await
    }

    pub async fn can_perceive(&self, observer: ActorId, target: ActorId) -> Result<bool> {
        self.request(|reply| Command::CanPerceive {
            observer,
            target,
            reply,
        })
        .await
    }

    pub async fn assess_threat(&self, observer: ActorId, target: ActorId) -> Result<ThreatLevel> {
        self.request(|reply| Command::AssessThreat {
            observer,
            target,
            reply,
        })
        .await
    }

    // ===== persistence =====

    pub async fn save(&self, actor: ActorId) -> Result<()> {
        self.request(|reply| Command::Save { actor, reply }).await
    }

    /// Restores the actor from its save, attaching it if needed.
    pub async fn load(&self, actor: ActorId) -> Result<LoadReport> {
        self.request(|reply| Command::Load { actor, reply }).await
    }

    // ===== events =====

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Sync` - Resource and ability blobs
    /// - `Topic::Notice` - Player-facing notices
    /// - `Topic::Alert` - Danger sense gaze alerts
    /// - `Topic::Divination` - Search reports and interruptions
    /// - `Topic::Effect` - Skill effects fired by hooks
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use beyonder_runtime::Topic;
    ///
    /// let mut alerts = handle.subscribe(Topic::Alert);
    /// while let Ok(event) = alerts.recv().await {
    ///     // Handle gaze alerts
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
