//! Learned skills, cooldowns, active skills and preset slots of one actor.
//!
//! Active skills and their durations share one map, so a duration exists
//! exactly when the skill is active. Cooldown entries are removed when they
//! reach zero. The passive cache is derived from `learned` and is rebuilt
//! whenever `learned` changes; it is never persisted.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::GameConfig;
use crate::env::SkillOracle;
use crate::state::{SkillId, StateError};

pub type PresetPage = [Option<SkillId>; GameConfig::SLOTS_PER_PAGE];

fn empty_presets() -> [PresetPage; GameConfig::MAX_PAGES] {
    std::array::from_fn(|_| std::array::from_fn(|_| None))
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityState {
    learned: BTreeSet<SkillId>,
    cooldowns: BTreeMap<SkillId, u32>,
    active: BTreeMap<SkillId, u32>,
    #[cfg_attr(feature = "serde", serde(skip))]
    passive_cache: BTreeSet<SkillId>,
    presets: [PresetPage; GameConfig::MAX_PAGES],
    active_page: usize,
}

impl Default for AbilityState {
    fn default() -> Self {
        Self::new()
    }
}

impl AbilityState {
    pub fn new() -> Self {
        Self {
            learned: BTreeSet::new(),
            cooldowns: BTreeMap::new(),
            active: BTreeMap::new(),
            passive_cache: BTreeSet::new(),
            presets: empty_presets(),
            active_page: 0,
        }
    }

    // ===== learned =====

    pub fn is_learned(&self, id: &SkillId) -> bool {
        self.learned.contains(id)
    }

    pub fn learned(&self) -> impl Iterator<Item = &SkillId> {
        self.learned.iter()
    }

    pub fn learned_count(&self) -> usize {
        self.learned.len()
    }

    /// Adds to `learned`; returns false when already present.
    pub(crate) fn insert_learned<S: SkillOracle + ?Sized>(
        &mut self,
        id: SkillId,
        skills: &S,
    ) -> bool {
        let inserted = self.learned.insert(id);
        if inserted {
            self.rebuild_passive_cache(skills);
        }
        inserted
    }

    /// Removes every trace of `id`: learned, passive cache, cooldown,
    /// active entry and preset slots. Returns false when nothing changed.
    pub(crate) fn purge(&mut self, id: &SkillId) -> bool {
        let was_learned = self.learned.remove(id);
        let had_cooldown = self.cooldowns.remove(id).is_some();
        let was_active = self.active.remove(id).is_some();
        let was_cached = self.passive_cache.remove(id);
        let mut in_preset = false;
        for page in self.presets.iter_mut() {
            for slot in page.iter_mut() {
                if slot.as_ref() == Some(id) {
                    *slot = None;
                    in_preset = true;
                }
            }
        }
        was_learned || had_cooldown || was_active || was_cached || in_preset
    }

    // ===== passive cache =====

    pub fn passives(&self) -> impl Iterator<Item = &SkillId> {
        self.passive_cache.iter()
    }

    pub fn is_passive(&self, id: &SkillId) -> bool {
        self.passive_cache.contains(id)
    }

    pub fn rebuild_passive_cache<S: SkillOracle + ?Sized>(&mut self, skills: &S) {
        self.passive_cache = self
            .learned
            .iter()
            .filter(|id| skills.definition(id).is_some_and(|def| def.is_passive()))
            .cloned()
            .collect();
    }

    // ===== cooldowns =====

    pub fn cooldown(&self, id: &SkillId) -> u32 {
        self.cooldowns.get(id).copied().unwrap_or(0)
    }

    pub fn cooldowns(&self) -> impl Iterator<Item = (&SkillId, u32)> {
        self.cooldowns.iter().map(|(id, ticks)| (id, *ticks))
    }

    /// Sets a cooldown; zero removes the entry.
    pub fn set_cooldown(&mut self, id: SkillId, ticks: u32) {
        if ticks == 0 {
            self.cooldowns.remove(&id);
        } else {
            self.cooldowns.insert(id, ticks);
        }
    }

    pub fn clear_cooldowns(&mut self) {
        self.cooldowns.clear();
    }

    /// Decrements every cooldown and drops the ones that reach zero.
    pub fn tick_cooldowns(&mut self) {
        self.cooldowns.retain(|_, ticks| {
            *ticks = ticks.saturating_sub(1);
            *ticks > 0
        });
    }

    // ===== active skills =====

    pub fn is_active(&self, id: &SkillId) -> bool {
        self.active.contains_key(id)
    }

    pub fn active_skills(&self) -> impl Iterator<Item = &SkillId> {
        self.active.keys()
    }

    pub fn active_duration(&self, id: &SkillId) -> Option<u32> {
        self.active.get(id).copied()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Marks a learned skill active with a fresh duration.
    pub(crate) fn activate(&mut self, id: SkillId) -> Result<(), StateError> {
        if !self.learned.contains(&id) {
            return Err(StateError::NotLearned(id));
        }
        self.active.insert(id, 0);
        Ok(())
    }

    pub(crate) fn deactivate(&mut self, id: &SkillId) -> bool {
        self.active.remove(id).is_some()
    }

    pub fn tick_durations(&mut self) {
        for duration in self.active.values_mut() {
            *duration = duration.saturating_add(1);
        }
    }

    // ===== presets =====

    pub fn active_page(&self) -> usize {
        self.active_page
    }

    pub fn set_active_page(&mut self, page: usize) -> Result<(), StateError> {
        check_page(page)?;
        self.active_page = page;
        Ok(())
    }

    pub fn preset(&self, page: usize, slot: usize) -> Result<Option<&SkillId>, StateError> {
        check_page(page)?;
        check_slot(slot)?;
        Ok(self.presets[page][slot].as_ref())
    }

    pub fn presets(&self) -> &[PresetPage; GameConfig::MAX_PAGES] {
        &self.presets
    }

    /// Binds a learned skill to a slot, replacing whatever was there.
    pub fn assign_preset(&mut self, page: usize, slot: usize, id: SkillId) -> Result<(), StateError> {
        check_page(page)?;
        check_slot(slot)?;
        if !self.learned.contains(&id) {
            return Err(StateError::NotLearned(id));
        }
        self.presets[page][slot] = Some(id);
        Ok(())
    }

    pub fn clear_preset(&mut self, page: usize, slot: usize) -> Result<Option<SkillId>, StateError> {
        check_page(page)?;
        check_slot(slot)?;
        Ok(self.presets[page][slot].take())
    }

    // ===== lifecycle =====

    /// Snapshot-and-replace used on respawn and realm transfer.
    ///
    /// Learned skills, presets and the page are copied verbatim. Cooldowns
    /// start empty. Of the source's active skills only passives stay active,
    /// each with a restarted duration.
    pub fn copy_from<S: SkillOracle + ?Sized>(&mut self, source: &AbilityState, skills: &S) {
        let mut next = AbilityState {
            learned: source.learned.clone(),
            cooldowns: BTreeMap::new(),
            active: BTreeMap::new(),
            passive_cache: BTreeSet::new(),
            presets: source.presets.clone(),
            active_page: source.active_page,
        };
        next.rebuild_passive_cache(skills);
        for id in source.active.keys() {
            if next.passive_cache.contains(id) {
                next.active.insert(id.clone(), 0);
            }
        }
        *self = next;
    }

    /// Checks the structural invariants; used by tests and after restores.
    pub fn validate<S: SkillOracle + ?Sized>(&self, skills: &S) -> Result<(), StateError> {
        if let Some(id) = self.active.keys().find(|id| !self.learned.contains(*id)) {
            return Err(StateError::ActiveNotLearned(id.clone()));
        }
        if let Some(id) = self
            .cooldowns
            .keys()
            .chain(self.active.keys())
            .find(|id| !skills.contains(id))
        {
            return Err(StateError::UnknownSkill(id.clone()));
        }
        if self.cooldowns.values().any(|ticks| *ticks == 0) {
            return Err(StateError::ZeroCooldownStored);
        }
        Ok(())
    }
}

fn check_page(page: usize) -> Result<(), StateError> {
    if page >= GameConfig::MAX_PAGES {
        return Err(StateError::InvalidPage {
            page,
            max: GameConfig::MAX_PAGES,
        });
    }
    Ok(())
}

fn check_slot(slot: usize) -> Result<(), StateError> {
    if slot >= GameConfig::SLOTS_PER_PAGE {
        return Err(StateError::InvalidSlot {
            slot,
            max: GameConfig::SLOTS_PER_PAGE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DANGER_SENSE, MIND_READ, SPIRIT_VISION, id, skills};

    fn learned_with(ids: &[&str]) -> AbilityState {
        let registry = skills();
        let mut state = AbilityState::new();
        for raw in ids {
            state.insert_learned(id(raw), &registry);
        }
        state
    }

    #[test]
    fn cooldowns_never_store_zero() {
        let mut state = AbilityState::new();
        state.set_cooldown(id(MIND_READ), 2);
        state.tick_cooldowns();
        assert_eq!(state.cooldown(&id(MIND_READ)), 1);
        state.tick_cooldowns();
        assert_eq!(state.cooldowns().count(), 0);

        state.set_cooldown(id(MIND_READ), 0);
        assert_eq!(state.cooldowns().count(), 0);
    }

    #[test]
    fn passive_cache_tracks_learned() {
        let state = learned_with(&[DANGER_SENSE, SPIRIT_VISION]);
        assert!(state.is_passive(&id(DANGER_SENSE)));
        assert!(!state.is_passive(&id(SPIRIT_VISION)));
    }

    #[test]
    fn cannot_activate_unlearned() {
        let mut state = AbilityState::new();
        assert_eq!(
            state.activate(id(SPIRIT_VISION)),
            Err(StateError::NotLearned(id(SPIRIT_VISION)))
        );
    }

    #[test]
    fn purge_clears_presets_on_every_page() {
        let mut state = learned_with(&[MIND_READ]);
        state.assign_preset(0, 1, id(MIND_READ)).unwrap();
        state.assign_preset(2, 8, id(MIND_READ)).unwrap();
        state.set_cooldown(id(MIND_READ), 30);

        assert!(state.purge(&id(MIND_READ)));
        assert_eq!(state.preset(0, 1).unwrap(), None);
        assert_eq!(state.preset(2, 8).unwrap(), None);
        assert_eq!(state.cooldown(&id(MIND_READ)), 0);
        assert!(!state.purge(&id(MIND_READ)));
    }

    #[test]
    fn preset_bounds_are_checked() {
        let mut state = learned_with(&[MIND_READ]);
        assert!(matches!(
            state.assign_preset(GameConfig::MAX_PAGES, 0, id(MIND_READ)),
            Err(StateError::InvalidPage { .. })
        ));
        assert!(matches!(
            state.assign_preset(0, GameConfig::SLOTS_PER_PAGE, id(MIND_READ)),
            Err(StateError::InvalidSlot { .. })
        ));
        assert!(state.set_active_page(3).is_err());
        assert!(state.set_active_page(2).is_ok());
    }

    #[test]
    fn copy_keeps_only_passive_activity() {
        let registry = skills();
        let mut source = learned_with(&[DANGER_SENSE, SPIRIT_VISION]);
        source.activate(id(DANGER_SENSE)).unwrap();
        source.activate(id(SPIRIT_VISION)).unwrap();
        source.tick_durations();
        source.set_cooldown(id(SPIRIT_VISION), 40);
        source.assign_preset(1, 3, id(SPIRIT_VISION)).unwrap();
        source.set_active_page(1).unwrap();

        let mut copy = AbilityState::new();
        copy.copy_from(&source, &registry);

        assert_eq!(copy.learned_count(), 2);
        assert_eq!(copy.active_duration(&id(DANGER_SENSE)), Some(0));
        assert!(!copy.is_active(&id(SPIRIT_VISION)));
        assert_eq!(copy.cooldowns().count(), 0);
        assert_eq!(copy.preset(1, 3).unwrap(), Some(&id(SPIRIT_VISION)));
        assert_eq!(copy.active_page(), 1);
        assert!(copy.validate(&registry).is_ok());
    }
}
