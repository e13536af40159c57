//! Five-level threat assessment.

use crate::env::{Attributes, Disposition};
use crate::state::{ActorId, Tier};

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatLevel {
    None,
    Low,
    Medium,
    High,
    Fatal,
}

/// The actor doing the assessing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThreatObserver {
    pub id: ActorId,
    /// `None` for non-Beyonders.
    pub tier: Option<Tier>,
    pub team: Option<u32>,
}

/// The actor or creature being assessed.
#[derive(Clone, Debug, PartialEq)]
pub struct ThreatSubject {
    /// `Some` when the subject is a Beyonder.
    pub tier: Option<Tier>,
    pub attributes: Attributes,
}

impl ThreatSubject {
    fn is_ally_of(&self, observer: &ThreatObserver) -> bool {
        let attrs = &self.attributes;
        attrs.owner == Some(observer.id)
            || matches!((attrs.team, observer.team), (Some(a), Some(b)) if a == b)
            || attrs.disposition == Disposition::Friendly
    }
}

pub fn evaluate(observer: &ThreatObserver, subject: &ThreatSubject) -> ThreatLevel {
    if subject.is_ally_of(observer) {
        return ThreatLevel::None;
    }
    match subject.tier {
        Some(target_tier) => beyonder_threat(observer.tier, target_tier),
        None => creature_threat(observer.id, &subject.attributes),
    }
}

/// Compares tiers; a non-Beyonder observer counts as one past the weakest tier.
pub fn beyonder_threat(observer_tier: Option<Tier>, target_tier: Tier) -> ThreatLevel {
    let diff = Tier::ordinal(observer_tier) - Tier::ordinal(Some(target_tier));
    match diff {
        d if d >= 2 => ThreatLevel::Fatal,
        d if d >= 0 => ThreatLevel::High,
        -1 => ThreatLevel::Medium,
        _ => ThreatLevel::Low,
    }
}

/// Scores a creature by `max_health + 5 × attack_damage`. Creatures that
/// are not hostile by nature and are not targeting the observer stay Low.
pub fn creature_threat(observer: ActorId, attributes: &Attributes) -> ThreatLevel {
    let score = attributes.max_health + attributes.attack_damage * 5.0;
    let level = if score > 100.0 {
        ThreatLevel::Fatal
    } else if score > 50.0 {
        ThreatLevel::High
    } else if score > 20.0 {
        ThreatLevel::Medium
    } else {
        ThreatLevel::Low
    };

    let aggressive = attributes.disposition == Disposition::Hostile
        || attributes.target == Some(observer);
    if aggressive {
        level
    } else {
        level.min(ThreatLevel::Low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(value: u8) -> Tier {
        Tier::new(value).unwrap()
    }

    fn observer(t: Option<u8>) -> ThreatObserver {
        ThreatObserver {
            id: ActorId(1),
            tier: t.map(tier),
            team: Some(4),
        }
    }

    #[test]
    fn beyonder_thresholds() {
        assert_eq!(beyonder_threat(Some(tier(9)), tier(7)), ThreatLevel::Fatal);
        assert_eq!(beyonder_threat(Some(tier(9)), tier(9)), ThreatLevel::High);
        assert_eq!(beyonder_threat(Some(tier(8)), tier(9)), ThreatLevel::Medium);
        assert_eq!(beyonder_threat(Some(tier(5)), tier(9)), ThreatLevel::Low);
        assert_eq!(beyonder_threat(None, tier(9)), ThreatLevel::High);
        assert_eq!(beyonder_threat(None, tier(8)), ThreatLevel::Fatal);
    }

    #[test]
    fn stronger_target_never_lowers_threat() {
        for obs in 0..=9u8 {
            for target in 1..=9u8 {
                let weaker = beyonder_threat(Some(tier(obs)), tier(target));
                let stronger = beyonder_threat(Some(tier(obs)), tier(target - 1));
                assert!(stronger >= weaker, "obs {obs} target {target}");
            }
        }
    }

    #[test]
    fn allies_are_no_threat() {
        let team_mate = ThreatSubject {
            tier: Some(tier(0)),
            attributes: Attributes::default().with_team(4),
        };
        assert_eq!(evaluate(&observer(Some(9)), &team_mate), ThreatLevel::None);

        let pet = ThreatSubject {
            tier: None,
            attributes: Attributes::default()
                .with_combat(500.0, 50.0)
                .with_disposition(Disposition::Hostile)
                .with_owner(ActorId(1)),
        };
        assert_eq!(evaluate(&observer(Some(9)), &pet), ThreatLevel::None);
    }

    #[test]
    fn passive_creatures_are_capped() {
        let golem = Attributes::default().with_combat(100.0, 15.0);
        assert_eq!(creature_threat(ActorId(1), &golem), ThreatLevel::Low);
        let angry = golem.clone().with_target(ActorId(1));
        assert_eq!(creature_threat(ActorId(1), &angry), ThreatLevel::Fatal);
        let zombie = Attributes::default()
            .with_combat(20.0, 3.0)
            .with_disposition(Disposition::Hostile);
        assert_eq!(creature_threat(ActorId(1), &zombie), ThreatLevel::Medium);
    }
}
