//! State pushed from the authoritative simulation to observers.
//!
//! Every blob flattens to string pairs so the transport stays oblivious of
//! the schema. Reading is lenient: an entry that does not parse is dropped
//! and counted, never fatal.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::config::GameConfig;
use crate::divination::{DivinationQuery, TargetKind};
use crate::perception::GazeBook;
use crate::state::{ActorId, ActorState, PathwayId, SkillId, Tier};

/// Flat key/value form of a blob.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FlatState(BTreeMap<String, String>);

impl FlatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries under `prefix`, with the prefix stripped from the key.
    pub fn with_prefix<'s>(
        &'s self,
        prefix: &'s str,
    ) -> impl Iterator<Item = (&'s str, &'s str)> + 's {
        self.0
            .range(prefix.to_owned()..)
            .map_while(move |(k, v)| Some((k.strip_prefix(prefix)?, v.as_str())))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl From<BTreeMap<String, String>> for FlatState {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, String)> for FlatState {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A blob decoded from a [`FlatState`], with the number of entries dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub dropped: usize,
}

impl<T> Decoded<T> {
    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn is_clean(&self) -> bool {
        self.dropped == 0
    }
}

/// Parses `raw` into `slot`, counting a failure instead of raising it.
fn read<T: FromStr>(raw: Option<&str>, slot: &mut T, dropped: &mut usize) {
    if let Some(raw) = raw {
        match raw.parse() {
            Ok(value) => *slot = value,
            Err(_) => *dropped += 1,
        }
    }
}

// ============================================================================
// Resource
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceBlob {
    pub current: f64,
    pub max: f64,
    pub combat_timer: u32,
    pub pathway: Option<PathwayId>,
    pub tier: Tier,
}

impl Default for ResourceBlob {
    fn default() -> Self {
        Self {
            current: 0.0,
            max: GameConfig::BASE_SPIRITUALITY,
            combat_timer: 0,
            pathway: None,
            tier: Tier::WEAKEST,
        }
    }
}

impl ResourceBlob {
    /// Captures the pushed view of `actor`; `max` is the cached value.
    pub fn capture(actor: &ActorState) -> Self {
        Self {
            current: actor.resource.current(),
            max: actor.resource.cached_max(),
            combat_timer: actor.resource.combat_timer(),
            pathway: actor.resource.pathway().cloned(),
            tier: actor.tier(),
        }
    }

    pub fn to_flat(&self) -> FlatState {
        let mut flat = FlatState::new();
        flat.insert("current", self.current);
        flat.insert("max", self.max);
        flat.insert("combat", self.combat_timer);
        flat.insert("tier", self.tier.value());
        if let Some(pathway) = &self.pathway {
            flat.insert("pathway", pathway);
        }
        flat
    }

    pub fn from_flat(flat: &FlatState) -> Decoded<Self> {
        let mut blob = Self::default();
        let mut dropped = 0;
        read(flat.get("current"), &mut blob.current, &mut dropped);
        read(flat.get("max"), &mut blob.max, &mut dropped);
        read(flat.get("combat"), &mut blob.combat_timer, &mut dropped);
        if let Some(raw) = flat.get("tier") {
            match raw.parse::<u8>().ok().and_then(|v| Tier::new(v).ok()) {
                Some(tier) => blob.tier = tier,
                None => dropped += 1,
            }
        }
        if let Some(raw) = flat.get("pathway") {
            match PathwayId::new(raw) {
                Ok(id) => blob.pathway = Some(id),
                Err(_) => dropped += 1,
            }
        }
        if !blob.current.is_finite() || blob.current < 0.0 {
            blob.current = 0.0;
            dropped += 1;
        }
        Decoded {
            value: blob,
            dropped,
        }
    }

    /// Whether the visible resource moved by more than `epsilon`.
    pub fn differs(&self, other: &Self, epsilon: f64) -> bool {
        (self.current - other.current).abs() > epsilon
            || (self.max - other.max).abs() > epsilon
            || self.tier != other.tier
            || self.pathway != other.pathway
            || self.combat_timer.min(1) != other.combat_timer.min(1)
    }
}

// ============================================================================
// Ability
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityBlob {
    pub learned: BTreeSet<SkillId>,
    pub cooldowns: BTreeMap<SkillId, u32>,
    /// Active skill to active duration.
    pub active: BTreeMap<SkillId, u32>,
    /// `(page, slot)` to bound skill.
    pub presets: BTreeMap<(usize, usize), SkillId>,
    pub active_page: usize,
}

impl AbilityBlob {
    pub fn capture(actor: &ActorState) -> Self {
        let ability = &actor.ability;
        let mut presets = BTreeMap::new();
        for (page, slots) in ability.presets().iter().enumerate() {
            for (slot, id) in slots.iter().enumerate() {
                if let Some(id) = id {
                    presets.insert((page, slot), id.clone());
                }
            }
        }
        Self {
            learned: ability.learned().cloned().collect(),
            cooldowns: ability
                .cooldowns()
                .map(|(id, ticks)| (id.clone(), ticks))
                .collect(),
            active: ability
                .active_skills()
                .map(|id| (id.clone(), ability.active_duration(id).unwrap_or(0)))
                .collect(),
            presets,
            active_page: ability.active_page(),
        }
    }

    pub fn to_flat(&self) -> FlatState {
        let mut flat = FlatState::new();
        let learned: Vec<&str> = self.learned.iter().map(SkillId::as_str).collect();
        flat.insert("learned", learned.join(","));
        for (id, ticks) in &self.cooldowns {
            flat.insert(format!("cooldown.{id}"), ticks);
        }
        for (id, duration) in &self.active {
            flat.insert(format!("active.{id}"), duration);
        }
        for ((page, slot), id) in &self.presets {
            flat.insert(format!("preset.{page}.{slot}"), id);
        }
        flat.insert("page", self.active_page);
        flat
    }

    pub fn from_flat(flat: &FlatState) -> Decoded<Self> {
        let mut blob = Self::default();
        let mut dropped = 0;

        if let Some(raw) = flat.get("learned") {
            for part in raw.split(',').filter(|p| !p.is_empty()) {
                match SkillId::new(part) {
                    Ok(id) => {
                        blob.learned.insert(id);
                    }
                    Err(_) => dropped += 1,
                }
            }
        }
        for (key, raw) in flat.with_prefix("cooldown.") {
            match (SkillId::new(key), raw.parse::<u32>()) {
                (Ok(_), Ok(0)) => {}
                (Ok(id), Ok(ticks)) => {
                    blob.cooldowns.insert(id, ticks);
                }
                _ => dropped += 1,
            }
        }
        for (key, raw) in flat.with_prefix("active.") {
            match (SkillId::new(key), raw.parse::<u32>()) {
                (Ok(id), Ok(duration)) => {
                    blob.active.insert(id, duration);
                }
                _ => dropped += 1,
            }
        }
        for (key, raw) in flat.with_prefix("preset.") {
            let coords = key
                .split_once('.')
                .and_then(|(p, s)| Some((p.parse::<usize>().ok()?, s.parse::<usize>().ok()?)))
                .filter(|(p, s)| *p < GameConfig::MAX_PAGES && *s < GameConfig::SLOTS_PER_PAGE);
            match (coords, SkillId::new(raw)) {
                (Some(coords), Ok(id)) => {
                    blob.presets.insert(coords, id);
                }
                _ => dropped += 1,
            }
        }
        read(flat.get("page"), &mut blob.active_page, &mut dropped);
        if blob.active_page >= GameConfig::MAX_PAGES {
            blob.active_page = 0;
            dropped += 1;
        }

        Decoded {
            value: blob,
            dropped,
        }
    }
}

// ============================================================================
// Perception
// ============================================================================

/// Who is currently watching the actor, plus its divination state.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerceptionBlob {
    /// Observer to consecutive gaze ticks.
    pub watchers: BTreeMap<ActorId, u32>,
    pub query: Option<DivinationQuery>,
    pub mastery: u32,
}

impl PerceptionBlob {
    /// Observers currently gazing at `actor`, plus its divination state.
    pub fn capture(actor: &ActorState, gaze: &GazeBook) -> Self {
        Self {
            watchers: gaze
                .watchers_of(actor.id)
                .filter(|(_, tracker)| tracker.is_gazing())
                .map(|(observer, tracker)| (observer, tracker.consecutive_ticks()))
                .collect(),
            query: actor.carrier.query().cloned(),
            mastery: actor.mastery(),
        }
    }

    /// Same watchers, query and mastery. Gaze counts are not compared.
    pub fn differs(&self, other: &Self) -> bool {
        !self.watchers.keys().eq(other.watchers.keys())
            || self.query != other.query
            || self.mastery != other.mastery
    }

    pub fn to_flat(&self) -> FlatState {
        let mut flat = FlatState::new();
        for (observer, ticks) in &self.watchers {
            flat.insert(format!("watcher.{}", observer.0), ticks);
        }
        if let Some(query) = &self.query {
            flat.insert("query.kind", query.kind);
            flat.insert("query.target", &query.target);
            flat.insert("query.difficulty", query.difficulty);
        }
        flat.insert("mastery", self.mastery);
        flat
    }

    pub fn from_flat(flat: &FlatState) -> Decoded<Self> {
        let mut blob = Self::default();
        let mut dropped = 0;
        for (key, raw) in flat.with_prefix("watcher.") {
            match (key.parse::<u32>(), raw.parse::<u32>()) {
                (Ok(observer), Ok(ticks)) => {
                    blob.watchers.insert(ActorId(observer), ticks);
                }
                _ => dropped += 1,
            }
        }
        let kind = flat.get("query.kind").map(TargetKind::from_str);
        match (kind, flat.get("query.target")) {
            (Some(Ok(kind)), Some(target)) if !target.is_empty() => {
                let mut difficulty = 0.0;
                read(flat.get("query.difficulty"), &mut difficulty, &mut dropped);
                blob.query = Some(DivinationQuery {
                    kind,
                    target: target.to_owned(),
                    difficulty,
                });
            }
            (None, None) => {}
            _ => dropped += 1,
        }
        read(flat.get("mastery"), &mut blob.mastery, &mut dropped);
        blob.mastery = blob.mastery.min(GameConfig::MAX_MASTERY);
        Decoded {
            value: blob,
            dropped,
        }
    }
}
