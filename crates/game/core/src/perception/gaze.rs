//! "Being watched" accumulators.

use std::collections::BTreeMap;

use crate::state::ActorId;

/// Composite key of an (observer, target) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairKey {
    pub observer: ActorId,
    pub target: ActorId,
}

impl PairKey {
    pub const fn new(observer: ActorId, target: ActorId) -> Self {
        Self { observer, target }
    }

    pub fn involves(&self, actor: ActorId) -> bool {
        self.observer == actor || self.target == actor
    }
}

/// Consecutive gaze time of one pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GazeTracker {
    consecutive_ticks: u32,
    is_gazing: bool,
}

impl GazeTracker {
    /// One-tick update: count up while looking, reset otherwise.
    pub fn update(&mut self, looking: bool) {
        self.advance(looking, 1);
    }

    /// Multi-tick update for passes that run every `ticks` ticks.
    pub fn advance(&mut self, looking: bool, ticks: u32) {
        if looking {
            self.consecutive_ticks = self.consecutive_ticks.saturating_add(ticks);
            self.is_gazing = true;
        } else {
            self.reset();
        }
    }

    pub fn is_triggered(&self, required_ticks: u32) -> bool {
        self.is_gazing && self.consecutive_ticks >= required_ticks
    }

    pub fn reset(&mut self) {
        self.consecutive_ticks = 0;
        self.is_gazing = false;
    }

    pub fn consecutive_ticks(&self) -> u32 {
        self.consecutive_ticks
    }

    pub fn is_gazing(&self) -> bool {
        self.is_gazing
    }
}

/// All gaze trackers and per-pair alert cooldowns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GazeBook {
    trackers: BTreeMap<PairKey, GazeTracker>,
    last_alert: BTreeMap<PairKey, u64>,
}

impl GazeBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracker(&self, pair: PairKey) -> Option<&GazeTracker> {
        self.trackers.get(&pair)
    }

    pub fn tracker_mut(&mut self, pair: PairKey) -> &mut GazeTracker {
        self.trackers.entry(pair).or_default()
    }

    /// Breaks the gaze of one pair. Unknown pairs stay unknown.
    pub fn reset(&mut self, pair: PairKey) {
        if let Some(tracker) = self.trackers.get_mut(&pair) {
            tracker.reset();
        }
    }

    /// Breaks every gaze on `target`.
    pub fn reset_watchers_of(&mut self, target: ActorId) {
        for (_, tracker) in self.trackers.iter_mut().filter(|(pair, _)| pair.target == target) {
            tracker.reset();
        }
    }

    /// Trackers whose target is `target`, with their observer.
    pub fn watchers_of(&self, target: ActorId) -> impl Iterator<Item = (ActorId, &GazeTracker)> {
        self.trackers
            .iter()
            .filter(move |(pair, _)| pair.target == target)
            .map(|(pair, tracker)| (pair.observer, tracker))
    }

    /// Whether an alert for `pair` is allowed at `now`.
    pub fn can_alert(&self, pair: PairKey, now: u64, cooldown: u64) -> bool {
        self.last_alert
            .get(&pair)
            .is_none_or(|last| now.saturating_sub(*last) >= cooldown)
    }

    pub fn record_alert(&mut self, pair: PairKey, now: u64) {
        self.last_alert.insert(pair, now);
    }

    /// Drops every tracker and alert cooldown that references `actor`.
    pub fn evict(&mut self, actor: ActorId) -> usize {
        let before = self.trackers.len() + self.last_alert.len();
        self.trackers.retain(|pair, _| !pair.involves(actor));
        self.last_alert.retain(|pair, _| !pair.involves(actor));
        before - self.trackers.len() - self.last_alert.len()
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_resets_when_gaze_breaks() {
        let mut tracker = GazeTracker::default();
        tracker.update(true);
        tracker.update(true);
        assert_eq!(tracker.consecutive_ticks(), 2);
        tracker.update(false);
        assert_eq!(tracker.consecutive_ticks(), 0);
        assert!(!tracker.is_triggered(0));
    }

    #[test]
    fn triggers_at_threshold_while_looking() {
        let mut tracker = GazeTracker::default();
        tracker.advance(true, 5);
        assert!(!tracker.is_triggered(6));
        tracker.advance(true, 5);
        assert!(tracker.is_triggered(10));
    }

    #[test]
    fn alert_cooldown_is_per_pair() {
        let mut book = GazeBook::new();
        let a = PairKey::new(ActorId(1), ActorId(2));
        let b = PairKey::new(ActorId(3), ActorId(2));
        book.record_alert(a, 100);
        assert!(!book.can_alert(a, 150, 200));
        assert!(book.can_alert(b, 150, 200));
        assert!(book.can_alert(a, 300, 200));
    }

    #[test]
    fn reset_breaks_gaze_without_creating_pairs() {
        let mut book = GazeBook::new();
        let watched = PairKey::new(ActorId(1), ActorId(2));
        book.tracker_mut(watched).advance(true, 40);
        book.tracker_mut(PairKey::new(ActorId(3), ActorId(2))).advance(true, 10);

        book.reset(PairKey::new(ActorId(4), ActorId(2)));
        assert_eq!(book.len(), 2);

        book.reset(watched);
        assert_eq!(book.tracker(watched).unwrap().consecutive_ticks(), 0);
        assert_eq!(book.watchers_of(ActorId(2)).filter(|(_, t)| t.is_gazing()).count(), 1);

        book.reset_watchers_of(ActorId(2));
        assert!(book.watchers_of(ActorId(2)).all(|(_, t)| !t.is_gazing()));
    }

    #[test]
    fn eviction_removes_both_roles() {
        let mut book = GazeBook::new();
        book.tracker_mut(PairKey::new(ActorId(1), ActorId(2))).update(true);
        book.tracker_mut(PairKey::new(ActorId(2), ActorId(3))).update(true);
        book.tracker_mut(PairKey::new(ActorId(3), ActorId(4))).update(true);
        book.record_alert(PairKey::new(ActorId(1), ActorId(2)), 5);

        assert_eq!(book.evict(ActorId(2)), 3);
        assert_eq!(book.len(), 1);
        assert!(book.can_alert(PairKey::new(ActorId(1), ActorId(2)), 6, 200));
    }
}
