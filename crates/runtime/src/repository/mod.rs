//! Repository layer for dynamic runtime data
//!
//! Repositories handle data that CHANGES during gameplay: per-actor saves
//! written in the versioned [`beyonder_core::PersistedActor`] schema.
//!
//! Static game content (skills, pathways) is handled by Oracles, not Repositories.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileActorRepo;
pub use memory::InMemoryActorRepo;
pub use traits::ActorRepository;
