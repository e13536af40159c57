//! Non-authoritative ability view kept by observers.
//!
//! The mirror counts cooldowns and active durations down locally so a HUD
//! stays smooth between pushes. Every received blob overwrites it wholesale.

use crate::state::SkillId;
use crate::sync::{AbilityBlob, Decoded, FlatState};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AbilityMirror {
    blob: AbilityBlob,
    ticks_since_apply: u32,
}

impl AbilityMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, blob: AbilityBlob) {
        self.blob = blob;
        self.ticks_since_apply = 0;
    }

    /// Applies a flat blob and returns how many entries were dropped.
    pub fn apply_flat(&mut self, flat: &FlatState) -> usize {
        let Decoded { value, dropped } = AbilityBlob::from_flat(flat);
        self.apply(value);
        dropped
    }

    /// Local prediction for one tick.
    pub fn tick(&mut self) {
        self.ticks_since_apply = self.ticks_since_apply.saturating_add(1);
        self.blob.cooldowns.retain(|_, ticks| {
            *ticks = ticks.saturating_sub(1);
            *ticks > 0
        });
        for duration in self.blob.active.values_mut() {
            *duration = duration.saturating_add(1);
        }
    }

    pub fn cooldown(&self, id: &SkillId) -> u32 {
        self.blob.cooldowns.get(id).copied().unwrap_or(0)
    }

    pub fn is_active(&self, id: &SkillId) -> bool {
        self.blob.active.contains_key(id)
    }

    pub fn is_learned(&self, id: &SkillId) -> bool {
        self.blob.learned.contains(id)
    }

    pub fn preset(&self, page: usize, slot: usize) -> Option<&SkillId> {
        self.blob.presets.get(&(page, slot))
    }

    pub fn active_page(&self) -> usize {
        self.blob.active_page
    }

    pub fn ticks_since_apply(&self) -> u32 {
        self.ticks_since_apply
    }

    pub fn view(&self) -> &AbilityBlob {
        &self.blob
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MIND_READ, SPIRIT_VISION, id};

    #[test]
    fn predicts_then_gets_overwritten() {
        let mut blob = AbilityBlob::default();
        blob.learned.insert(id(MIND_READ));
        blob.cooldowns.insert(id(MIND_READ), 2);
        blob.active.insert(id(SPIRIT_VISION), 0);

        let mut mirror = AbilityMirror::new();
        mirror.apply(blob.clone());
        mirror.tick();
        assert_eq!(mirror.cooldown(&id(MIND_READ)), 1);
        mirror.tick();
        assert_eq!(mirror.cooldown(&id(MIND_READ)), 0);
        assert!(mirror.view().cooldowns.is_empty());
        assert_eq!(mirror.view().active.get(&id(SPIRIT_VISION)), Some(&2));

        let dropped = mirror.apply_flat(&blob.to_flat());
        assert_eq!(dropped, 0);
        assert_eq!(mirror.cooldown(&id(MIND_READ)), 2);
        assert_eq!(mirror.ticks_since_apply(), 0);
    }
}
