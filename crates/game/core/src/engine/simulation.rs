use std::collections::{BTreeMap, BTreeSet};

use crate::perception::GazeBook;
use crate::state::{ActorId, ActorState};

/// Everything the authoritative simulation owns.
#[derive(Clone, Debug, Default)]
pub struct SimulationState {
    pub(super) actors: BTreeMap<ActorId, ActorState>,
    pub(super) gaze: GazeBook,
    pub(super) tick: u64,
    pub(super) seed: u64,
    /// Actors running a continuous divination search.
    pub(super) searching: BTreeSet<ActorId>,
}

impl SimulationState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn actor(&self, id: ActorId) -> Option<&ActorState> {
        self.actors.get(&id)
    }

    pub fn actors(&self) -> impl Iterator<Item = &ActorState> {
        self.actors.values()
    }

    pub fn actor_ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actors.keys().copied()
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn gaze(&self) -> &GazeBook {
        &self.gaze
    }

    pub fn is_searching(&self, id: ActorId) -> bool {
        self.searching.contains(&id)
    }
}
