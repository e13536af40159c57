//! Runtime orchestration for the Beyonder ability simulation.
//!
//! This crate wires together oracle access, skill effect hooks, repositories
//! and the simulation worker into a cohesive runtime API. Consumers embed
//! [`Runtime`] to drive ticks, subscribe to events, and interact with actors
//! through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`workers`] keeps background tasks internal to the crate
//! - [`hooks`] turns skill effect callbacks into runtime follow-ups
//! - [`oracle`] and [`repository`] provide data adapters reused by other crates
pub mod api;
pub mod events;
pub mod hooks;
pub mod oracle;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{
    DivinationEvent, EffectEvent, EffectPhase, Event, EventBus, NoticeEvent, SyncEvent, Topic,
};
pub use hooks::{
    CombatHook, DivinationHook, EffectLogHook, HookAction, HookContext, HookCriticality,
    HookError, HookPhase, HookRegistry, SkillHook,
};
pub use oracle::{AttributeTable, GridWorld, OracleBundle};
pub use repository::{
    ActorRepository, FileActorRepo, InMemoryActorRepo, RepositoryError,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
