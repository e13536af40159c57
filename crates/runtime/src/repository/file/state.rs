//! File-based ActorRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use beyonder_core::{ActorId, PersistedActor};

use crate::repository::{ActorRepository, RepositoryError, Result};

/// File-based implementation of ActorRepository.
///
/// Stores one save per actor as `actor_{id}.bin` in bincode format.
/// Writes go to a temp file first and are moved into place with an atomic
/// rename, so a crash never leaves a half-written save behind.
pub struct FileActorRepo {
    base_dir: PathBuf,
}

impl FileActorRepo {
    /// Create a new file-based repository, creating the directory if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn save_path(&self, actor: ActorId) -> PathBuf {
        self.base_dir.join(format!("actor_{}.bin", actor.0))
    }

    /// Decodes a save file written by this repository.
    pub fn read_file(path: &Path) -> Result<PersistedActor> {
        let bytes = fs::read(path)?;
        bincode::deserialize(&bytes)
            .map_err(|e| RepositoryError::CorruptedData(format!("{}: {}", path.display(), e)))
    }
}

impl ActorRepository for FileActorRepo {
    fn save(&self, actor: ActorId, save: &PersistedActor) -> Result<()> {
        let path = self.save_path(actor);
        let temp_path = path.with_extension("bin.tmp");

        let bytes =
            bincode::serialize(save).map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!("Saved actor[{}] to {}", actor, path.display());

        Ok(())
    }

    fn load(&self, actor: ActorId) -> Result<Option<PersistedActor>> {
        let path = self.save_path(actor);

        if !path.exists() {
            return Ok(None);
        }

        let save = Self::read_file(&path)?;
        tracing::debug!("Loaded actor[{}] from {}", actor, path.display());

        Ok(Some(save))
    }

    fn exists(&self, actor: ActorId) -> bool {
        self.save_path(actor).exists()
    }

    fn delete(&self, actor: ActorId) -> Result<()> {
        let path = self.save_path(actor);

        if path.exists() {
            fs::remove_file(&path)?;
            tracing::debug!("Deleted actor[{}]", actor);
        }

        Ok(())
    }

    fn list_actors(&self) -> Result<Vec<ActorId>> {
        let mut actors = Vec::new();

        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(id) = filename
                    .strip_prefix("actor_")
                    .and_then(|s| s.strip_suffix(".bin"))
                && let Ok(id) = id.parse::<u32>()
            {
                actors.push(ActorId(id));
            }
        }

        actors.sort_unstable();
        Ok(actors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beyonder_core::ActorState;

    fn save(id: u32) -> PersistedActor {
        PersistedActor::capture(&ActorState::new(ActorId(id)))
    }

    #[test]
    fn save_load_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileActorRepo::new(dir.path().join("saves")).unwrap();

        repo.save(ActorId(7), &save(7)).unwrap();
        repo.save(ActorId(3), &save(3)).unwrap();

        assert!(repo.exists(ActorId(7)));
        assert_eq!(repo.load(ActorId(7)).unwrap(), Some(save(7)));
        assert_eq!(repo.load(ActorId(9)).unwrap(), None);
        assert_eq!(repo.list_actors().unwrap(), vec![ActorId(3), ActorId(7)]);
        assert!(!repo.base_dir().join("actor_7.bin.tmp").exists());

        repo.delete(ActorId(7)).unwrap();
        assert!(!repo.exists(ActorId(7)));
    }

    #[test]
    fn garbage_is_reported_as_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileActorRepo::new(dir.path()).unwrap();
        fs::write(dir.path().join("actor_1.bin"), b"not a save").unwrap();

        assert!(matches!(
            repo.load(ActorId(1)),
            Err(RepositoryError::CorruptedData(_))
        ));
    }
}
