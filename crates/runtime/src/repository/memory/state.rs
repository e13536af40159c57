//! In-memory ActorRepository implementation for tests and local runs.

use std::collections::BTreeMap;
use std::sync::RwLock;

use beyonder_core::{ActorId, PersistedActor};

use crate::repository::{ActorRepository, RepositoryError, Result};

/// In-memory implementation of ActorRepository.
#[derive(Default)]
pub struct InMemoryActorRepo {
    saves: RwLock<BTreeMap<ActorId, PersistedActor>>,
}

impl InMemoryActorRepo {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ActorRepository for InMemoryActorRepo {
    fn save(&self, actor: ActorId, save: &PersistedActor) -> Result<()> {
        let mut saves = self
            .saves
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        saves.insert(actor, save.clone());
        Ok(())
    }

    fn load(&self, actor: ActorId) -> Result<Option<PersistedActor>> {
        let saves = self
            .saves
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(saves.get(&actor).cloned())
    }

    fn exists(&self, actor: ActorId) -> bool {
        self.saves
            .read()
            .map(|saves| saves.contains_key(&actor))
            .unwrap_or(false)
    }

    fn delete(&self, actor: ActorId) -> Result<()> {
        let mut saves = self
            .saves
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        saves.remove(&actor);
        Ok(())
    }

    fn list_actors(&self) -> Result<Vec<ActorId>> {
        let saves = self
            .saves
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(saves.keys().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beyonder_core::{ActorFlags, ActorState};

    #[test]
    fn overwrite_and_delete() {
        let repo = InMemoryActorRepo::new();
        let plain = PersistedActor::capture(&ActorState::new(ActorId(4)));
        let beyonder = PersistedActor::capture(
            &ActorState::new(ActorId(4)).with_flags(ActorFlags::BEYONDER),
        );

        repo.save(ActorId(4), &plain).unwrap();
        repo.save(ActorId(4), &beyonder).unwrap();
        assert_eq!(repo.load(ActorId(4)).unwrap(), Some(beyonder));
        assert_eq!(repo.list_actors().unwrap(), vec![ActorId(4)]);

        repo.delete(ActorId(4)).unwrap();
        assert!(!repo.exists(ActorId(4)));
        assert!(repo.list_actors().unwrap().is_empty());
    }
}
