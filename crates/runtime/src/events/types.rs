//! Event payloads for the individual topics.

use beyonder_core::sync::SyncPush;
use beyonder_core::{ActorId, DeactivationReason, DivinationReport, Notice, SkillId};
use serde::{Deserialize, Serialize};

/// Blobs pushed to observers of one actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEvent {
    pub actor: ActorId,
    pub tick: u64,
    pub push: SyncPush,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeEvent {
    pub actor: ActorId,
    pub tick: u64,
    pub notice: Notice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DivinationEvent {
    /// A search ran to completion.
    Report {
        actor: ActorId,
        tick: u64,
        report: DivinationReport,
    },
    /// A search could not run (no query, no pose, actor gone).
    Interrupted {
        actor: ActorId,
        tick: u64,
        code: String,
        message: String,
    },
}

/// Which effect callback fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectPhase {
    Cast { hold_ticks: u32 },
    Deactivate(DeactivationReason),
}

/// A skill effect fired for an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectEvent {
    pub actor: ActorId,
    pub skill: SkillId,
    /// Effect routing key of the definition.
    pub effect: String,
    pub target: Option<ActorId>,
    pub phase: EffectPhase,
}
