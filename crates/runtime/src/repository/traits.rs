//! Repository contracts for saving and loading actor state.

use beyonder_core::{ActorId, PersistedActor};

use super::Result;

/// Repository for per-actor saves.
///
/// Saves are keyed by actor id; saving again overwrites.
pub trait ActorRepository: Send + Sync {
    fn save(&self, actor: ActorId, save: &PersistedActor) -> Result<()>;

    fn load(&self, actor: ActorId) -> Result<Option<PersistedActor>>;

    fn exists(&self, actor: ActorId) -> bool;

    fn delete(&self, actor: ActorId) -> Result<()>;

    /// All actors with a save, in ascending id order.
    fn list_actors(&self) -> Result<Vec<ActorId>> {
        Ok(vec![])
    }
}
