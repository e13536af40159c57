//! Deterministic ability, perception and divination rules.
//!
//! `beyonder-core` defines the canonical rules (skill casting, the
//! spirituality economy, perception contests, danger sense and divination)
//! and exposes pure APIs that can be reused by both the runtime and offline
//! tools. All state mutation flows through [`engine::GameEngine`], and
//! supporting crates depend on the types re-exported here.
pub mod config;
pub mod divination;
pub mod engine;
pub mod env;
pub mod error;
pub mod geometry;
pub mod perception;
pub mod skill;
pub mod state;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{GameConfig, ScanStrategyKind};
pub use divination::{
    BlockScanStrategy, DivinationQuery, DivinationReport, DivinationResult, SearchMode, TargetKind,
};
pub use engine::{EngineError, GameEngine, SimulationState, StepReport};
pub use env::{
    AttributeOracle, Attributes, Env, GameEnv, PathwayDefinition, PathwayRegistry, PcgRng, Pose,
    ProgressionOracle, RngOracle, SkillOracle, SkillRegistry, TierRow, WorldEntity, WorldOracle,
};
pub use error::{ErrorSeverity, GameError};
pub use geometry::{Aabb, BlockPos, Vec3};
pub use perception::{GazeAlert, ThreatLevel};
pub use skill::{
    CastContext, CastOutcome, CastRejection, CastType, DeactivationReason, Notice,
    SkillDefinition, SkillEffects, SkillTags,
};
pub use state::{ActorFlags, ActorId, ActorState, PathwayId, SkillId, Tier};
pub use sync::{AbilityBlob, FlatState, LoadReport, PerceptionBlob, PersistedActor, ResourceBlob};
