//! Actor attributes served through [`beyonder_core::AttributeOracle`].

use std::collections::BTreeMap;

use beyonder_core::{ActorId, AttributeOracle, Attributes};

/// Attribute lookups keyed by actor, updated by the host.
#[derive(Clone, Debug, Default)]
pub struct AttributeTable {
    entries: BTreeMap<ActorId, Attributes>,
}

impl AttributeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the actor's attributes, returning the previous ones.
    pub fn set(&mut self, actor: ActorId, attributes: Attributes) -> Option<Attributes> {
        self.entries.insert(actor, attributes)
    }

    pub fn remove(&mut self, actor: ActorId) -> Option<Attributes> {
        self.entries.remove(&actor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AttributeOracle for AttributeTable {
    fn attributes(&self, actor: ActorId) -> Option<Attributes> {
        self.entries.get(&actor).cloned()
    }
}
