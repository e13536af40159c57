//! State sync and persistence: what leaves the authoritative simulation.
mod blob;
mod mirror;
mod persist;
mod tracker;

pub use blob::{AbilityBlob, Decoded, FlatState, PerceptionBlob, ResourceBlob};
pub use mirror::AbilityMirror;
pub use persist::{LoadReport, PersistError, PersistedActor};
pub use tracker::{SyncPush, SyncReason, SyncTracker};
