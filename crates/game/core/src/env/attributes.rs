//! Per-actor attribute lookups supplied by the host game.

use crate::state::ActorId;

/// Broad disposition of a creature kind.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum Disposition {
    /// Never a threat (pets, villagers).
    Friendly,
    #[default]
    Neutral,
    /// Attacks on sight.
    Hostile,
}

/// Raw attributes of an actor or creature.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Attributes {
    pub detection: f64,
    pub concealment: f64,
    pub attack_damage: f64,
    pub max_health: f64,
    pub disposition: Disposition,
    /// Owner of a tamed or summoned creature.
    pub owner: Option<ActorId>,
    pub team: Option<u32>,
    /// Actor this creature is currently attacking.
    pub target: Option<ActorId>,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            detection: 0.0,
            concealment: 0.0,
            attack_damage: 0.0,
            max_health: 20.0,
            disposition: Disposition::Neutral,
            owner: None,
            team: None,
            target: None,
        }
    }
}

impl Attributes {
    pub fn with_perception(mut self, detection: f64, concealment: f64) -> Self {
        self.detection = detection;
        self.concealment = concealment;
        self
    }

    pub fn with_combat(mut self, max_health: f64, attack_damage: f64) -> Self {
        self.max_health = max_health;
        self.attack_damage = attack_damage;
        self
    }

    pub fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = disposition;
        self
    }

    pub fn with_team(mut self, team: u32) -> Self {
        self.team = Some(team);
        self
    }

    pub fn with_owner(mut self, owner: ActorId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_target(mut self, target: ActorId) -> Self {
        self.target = Some(target);
        self
    }
}

/// Attribute lookup for actors known to the host.
pub trait AttributeOracle: Send + Sync {
    fn attributes(&self, actor: ActorId) -> Option<Attributes>;

    fn detection(&self, actor: ActorId) -> f64 {
        self.attributes(actor).map_or(0.0, |a| a.detection)
    }

    fn concealment(&self, actor: ActorId) -> f64 {
        self.attributes(actor).map_or(0.0, |a| a.concealment)
    }
}
