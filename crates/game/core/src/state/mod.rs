//! Mutable per-actor state.
//!
//! [`ActorState`] bundles the spirituality pool, the ability bookkeeping,
//! the mode flags and the divination carrier of one actor. Only the engine
//! and the cast machine mutate it; everything else reads.
mod ability;
mod actor;
mod error;
mod ids;
mod resource;

pub use ability::{AbilityState, PresetPage};
pub use actor::{ActorFlags, ActorState};
pub use error::StateError;
pub use ids::{ActorId, KeyError, PathwayId, SkillId, Tier, TierError};
pub use resource::ResourceState;
