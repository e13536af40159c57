//! Spirituality: the bounded resource every cast draws on.

use crate::config::GameConfig;
use crate::env::ProgressionOracle;
use crate::state::{PathwayId, Tier};

/// Per-actor spirituality pool.
///
/// `max` is derived from the progression table and cached; changing the
/// pathway or tier only marks it dirty. The next read of `max` or any
/// mutation of `current` recomputes it and clamps `current` down, so
/// `0 <= current <= max` holds after every public call that takes the
/// progression oracle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceState {
    current: f64,
    max: f64,
    dirty: bool,
    combat_timer: u32,
    regen_ticks: u32,
    pathway: Option<PathwayId>,
    tier: Tier,
}

impl Default for ResourceState {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceState {
    pub fn new() -> Self {
        Self {
            current: GameConfig::BASE_SPIRITUALITY,
            max: GameConfig::BASE_SPIRITUALITY,
            dirty: true,
            combat_timer: 0,
            regen_ticks: 0,
            pathway: None,
            tier: Tier::WEAKEST,
        }
    }

    pub fn pathway(&self) -> Option<&PathwayId> {
        self.pathway.as_ref()
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Changes pathway and tier; `max` is recomputed lazily.
    pub fn set_progression(&mut self, pathway: Option<PathwayId>, tier: Tier) {
        if self.pathway != pathway || self.tier != tier {
            self.pathway = pathway;
            self.tier = tier;
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn compute_max<P: ProgressionOracle + ?Sized>(&self, progression: &P) -> f64 {
        let bonus = self
            .pathway
            .as_ref()
            .map_or(0.0, |id| progression.spirituality_bonus(id, self.tier));
        (GameConfig::BASE_SPIRITUALITY + bonus).max(0.0)
    }

    /// Recomputes `max` if dirty and clamps `current`.
    pub fn refresh<P: ProgressionOracle + ?Sized>(&mut self, progression: &P) {
        if self.dirty {
            self.max = self.compute_max(progression);
            self.dirty = false;
        }
        self.current = self.current.clamp(0.0, self.max);
    }

    pub fn max<P: ProgressionOracle + ?Sized>(&mut self, progression: &P) -> f64 {
        self.refresh(progression);
        self.max
    }

    /// Last computed maximum; may be stale while the cache is dirty.
    pub fn cached_max(&self) -> f64 {
        self.max
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    /// `current` as it will read after the next refresh, without mutating.
    pub fn effective_current<P: ProgressionOracle + ?Sized>(&self, progression: &P) -> f64 {
        let max = if self.dirty {
            self.compute_max(progression)
        } else {
            self.max
        };
        self.current.clamp(0.0, max)
    }

    /// Deducts `amount` only if all of it is available.
    pub fn consume<P: ProgressionOracle + ?Sized>(&mut self, progression: &P, amount: f64) -> bool {
        self.refresh(progression);
        if amount <= 0.0 {
            return true;
        }
        if self.current < amount {
            return false;
        }
        self.current -= amount;
        true
    }

    /// Adds `amount`, clamped to `max`. Returns the amount actually restored.
    pub fn recover<P: ProgressionOracle + ?Sized>(&mut self, progression: &P, amount: f64) -> f64 {
        self.refresh(progression);
        if amount <= 0.0 {
            return 0.0;
        }
        let before = self.current;
        self.current = (self.current + amount).min(self.max);
        self.current - before
    }

    pub fn fill<P: ProgressionOracle + ?Sized>(&mut self, progression: &P) {
        self.refresh(progression);
        self.current = self.max;
    }

    /// Sets `current` directly (restore paths), clamped to `[0, max]`.
    pub fn set_current<P: ProgressionOracle + ?Sized>(&mut self, progression: &P, value: f64) {
        self.refresh(progression);
        self.current = if value.is_finite() {
            value.clamp(0.0, self.max)
        } else {
            0.0
        };
    }

    pub fn combat_timer(&self) -> u32 {
        self.combat_timer
    }

    pub fn in_combat(&self) -> bool {
        self.combat_timer > 0
    }

    pub fn enter_combat(&mut self) {
        self.combat_timer = GameConfig::COMBAT_DURATION_TICKS;
    }

    pub(crate) fn set_combat_timer(&mut self, ticks: u32) {
        self.combat_timer = ticks.min(GameConfig::COMBAT_DURATION_TICKS);
    }

    /// Advances one tick: combat timer countdown, then regen every
    /// [`GameConfig::REGEN_INTERVAL_TICKS`]. Returns the amount regenerated.
    pub fn tick<P: ProgressionOracle + ?Sized>(
        &mut self,
        progression: &P,
        config: &GameConfig,
    ) -> f64 {
        if self.combat_timer > 0 {
            self.combat_timer -= 1;
        }
        self.regen_ticks += 1;
        if self.regen_ticks < GameConfig::REGEN_INTERVAL_TICKS {
            return 0.0;
        }
        self.regen_ticks = 0;

        let max = self.max(progression);
        if self.current >= max {
            return 0.0;
        }
        let mut regen = config.base_regen + GameConfig::MAX_REGEN_FRACTION * max;
        if self.in_combat() {
            regen *= GameConfig::COMBAT_REGEN_FACTOR;
        }
        self.recover(progression, regen)
    }

    /// Snapshot-and-replace from another actor's pool (respawn, realm transfer).
    ///
    /// Keeps pathway, tier and current; combat state and the regen
    /// accumulator start over. `max` is recomputed on next access.
    pub fn copy_from(&mut self, source: &ResourceState) {
        *self = Self {
            current: source.current,
            max: source.max,
            dirty: true,
            combat_timer: 0,
            regen_ticks: 0,
            pathway: source.pathway.clone(),
            tier: source.tier,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{pathways, seer};

    fn tier(value: u8) -> Tier {
        Tier::new(value).unwrap()
    }

    #[test]
    fn max_includes_pathway_bonus_lazily() {
        let table = pathways();
        let mut resource = ResourceState::new();
        assert_eq!(resource.max(&table), 100.0);

        resource.set_progression(Some(seer()), tier(9));
        assert!(resource.is_dirty());
        assert_eq!(resource.cached_max(), 100.0);
        assert_eq!(resource.max(&table), 150.0);
        assert!(!resource.is_dirty());
    }

    #[test]
    fn lowering_max_clamps_current() {
        let table = pathways();
        let mut resource = ResourceState::new();
        resource.set_progression(Some(seer()), tier(9));
        resource.fill(&table);
        assert_eq!(resource.current(), 150.0);

        resource.set_progression(None, tier(9));
        assert_eq!(resource.effective_current(&table), 100.0);
        assert_eq!(resource.max(&table), 100.0);
        assert_eq!(resource.current(), 100.0);
    }

    #[test]
    fn consume_is_all_or_nothing() {
        let table = pathways();
        let mut resource = ResourceState::new();
        resource.set_current(&table, 5.0);
        assert!(!resource.consume(&table, 10.0));
        assert_eq!(resource.current(), 5.0);
        assert!(resource.consume(&table, 5.0));
        assert_eq!(resource.current(), 0.0);
    }

    #[test]
    fn recover_clamps_to_max() {
        let table = pathways();
        let mut resource = ResourceState::new();
        resource.set_current(&table, 95.0);
        assert_eq!(resource.recover(&table, 20.0), 5.0);
        assert_eq!(resource.current(), 100.0);
    }

    #[test]
    fn regen_fires_every_interval() {
        let table = pathways();
        let config = GameConfig::default();
        let mut resource = ResourceState::new();
        resource.set_current(&table, 50.0);

        for _ in 0..GameConfig::REGEN_INTERVAL_TICKS - 1 {
            assert_eq!(resource.tick(&table, &config), 0.0);
        }
        let regen = resource.tick(&table, &config);
        assert!((regen - 1.1).abs() < 1e-9);
        assert!((resource.current() - 51.1).abs() < 1e-9);
    }

    #[test]
    fn combat_cuts_regen_to_a_tenth() {
        let table = pathways();
        let config = GameConfig::default();
        let mut resource = ResourceState::new();
        resource.set_current(&table, 50.0);
        resource.enter_combat();

        let mut total = 0.0;
        for _ in 0..GameConfig::REGEN_INTERVAL_TICKS {
            total += resource.tick(&table, &config);
        }
        assert!((total - 0.11).abs() < 1e-9);
        assert_eq!(
            resource.combat_timer(),
            GameConfig::COMBAT_DURATION_TICKS - GameConfig::REGEN_INTERVAL_TICKS
        );
    }

    #[test]
    fn combat_timer_runs_out() {
        let table = pathways();
        let config = GameConfig::default();
        let mut resource = ResourceState::new();
        resource.enter_combat();
        for _ in 0..GameConfig::COMBAT_DURATION_TICKS {
            resource.tick(&table, &config);
        }
        assert!(!resource.in_combat());
    }

    #[test]
    fn copy_resets_combat_and_keeps_progression() {
        let table = pathways();
        let mut source = ResourceState::new();
        source.set_progression(Some(seer()), tier(9));
        source.set_current(&table, 120.0);
        source.enter_combat();

        let mut copy = ResourceState::new();
        copy.copy_from(&source);
        assert_eq!(copy.pathway(), Some(&seer()));
        assert!(!copy.in_combat());
        assert_eq!(copy.max(&table), 150.0);
        assert_eq!(copy.current(), 120.0);
    }
}
