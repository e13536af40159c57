//! Static skill definitions.
//!
//! A [`SkillDefinition`] is immutable once registered. Cast types form a
//! closed enum whose payload carries the per-mode parameters, so the cast
//! state machine can match on them exhaustively.

use crate::state::{SkillId, Tier};

/// How a skill is activated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastType {
    /// Fires once and goes on cooldown.
    Instant,
    /// Maintained effect switched on and off by casting.
    Toggle { deactivatable: bool },
    /// Maintained summon; behaves like a toggle.
    SummonMaintain { deactivatable: bool },
    /// One-shot summon.
    SummonInstant,
    /// Released after holding; the hold time is clamped to `max_charge_ticks`.
    Charging { max_charge_ticks: u32 },
    /// Held effect released after at most `max_ticks`.
    Channeling { max_ticks: u32 },
    /// Fires after an incantation of `chant_ticks`.
    Chanting { chant_ticks: u32 },
    /// Always-on capability; never cast directly.
    Passive,
}

/// Payload-free tag of a [`CastType`], used for display and filtering.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum CastKind {
    Instant,
    Toggle,
    SummonMaintain,
    SummonInstant,
    Charging,
    Channeling,
    Chanting,
    Passive,
}

impl CastType {
    pub const fn kind(&self) -> CastKind {
        match self {
            CastType::Instant => CastKind::Instant,
            CastType::Toggle { .. } => CastKind::Toggle,
            CastType::SummonMaintain { .. } => CastKind::SummonMaintain,
            CastType::SummonInstant => CastKind::SummonInstant,
            CastType::Charging { .. } => CastKind::Charging,
            CastType::Channeling { .. } => CastKind::Channeling,
            CastType::Chanting { .. } => CastKind::Chanting,
            CastType::Passive => CastKind::Passive,
        }
    }

    /// True for cast types that stay active until switched off.
    pub const fn is_maintained(&self) -> bool {
        matches!(
            self,
            CastType::Toggle { .. } | CastType::SummonMaintain { .. }
        )
    }

    pub const fn is_passive(&self) -> bool {
        matches!(self, CastType::Passive)
    }

    /// Whether an active maintained skill may be switched off by casting it again.
    pub const fn can_be_deactivated(&self) -> bool {
        match self {
            CastType::Toggle { deactivatable } | CastType::SummonMaintain { deactivatable } => {
                *deactivatable
            }
            _ => true,
        }
    }

    /// Upper bound on the hold time accepted by the effect hook.
    pub const fn hold_limit(&self) -> u32 {
        match self {
            CastType::Charging { max_charge_ticks } => *max_charge_ticks,
            CastType::Channeling { max_ticks } => *max_ticks,
            CastType::Chanting { chant_ticks } => *chant_ticks,
            _ => 0,
        }
    }
}

bitflags::bitflags! {
    /// Capabilities a skill contributes to systems outside the cast machine.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct SkillTags: u8 {
        /// Adds the rank-scaled sight bonus to perception contests while active.
        const ENHANCED_SIGHT = 1 << 0;
        /// Target side of the gaze tracker: the bearer feels being watched.
        const DANGER_SENSE = 1 << 1;
        /// Effect runs a divination search.
        const DIVINATION = 1 << 2;
        /// Casting is a hostile act (puts caster and target in combat).
        const HOSTILE = 1 << 3;
    }
}

/// Resource amount that scales with tier rank: `base + per_rank × rank`, never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScaledAmount {
    pub base: f64,
    pub per_rank: f64,
}

impl ScaledAmount {
    pub const ZERO: Self = Self::flat(0.0);

    pub const fn flat(base: f64) -> Self {
        Self {
            base,
            per_rank: 0.0,
        }
    }

    pub const fn scaled(base: f64, per_rank: f64) -> Self {
        Self { base, per_rank }
    }

    pub fn at(&self, tier: Tier) -> f64 {
        (self.base + self.per_rank * tier.rank() as f64).max(0.0)
    }
}

/// Cooldown that shortens with tier rank, bounded below by `min_ticks`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CooldownSpec {
    pub base_ticks: u32,
    pub per_rank_reduction: u32,
    pub min_ticks: u32,
}

impl CooldownSpec {
    pub const NONE: Self = Self::fixed(0);

    pub const fn fixed(ticks: u32) -> Self {
        Self {
            base_ticks: ticks,
            per_rank_reduction: 0,
            min_ticks: 0,
        }
    }

    pub fn ticks_at(&self, tier: Tier) -> u32 {
        let reduction = self.per_rank_reduction.saturating_mul(tier.rank() as u32);
        self.base_ticks
            .saturating_sub(reduction)
            .max(self.min_ticks)
    }
}

/// Immutable definition of one learnable skill.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDefinition {
    pub id: SkillId,
    pub cast_type: CastType,
    pub cost: ScaledAmount,
    #[cfg_attr(feature = "serde", serde(default))]
    pub upkeep: ScaledAmount,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown: CooldownSpec,
    /// Key the runtime uses to route the effect hook.
    #[cfg_attr(feature = "serde", serde(default))]
    pub effect: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: SkillTags,
}

impl SkillDefinition {
    pub fn new(id: SkillId, cast_type: CastType) -> Self {
        Self {
            id,
            cast_type,
            cost: ScaledAmount::ZERO,
            upkeep: ScaledAmount::ZERO,
            cooldown: CooldownSpec::NONE,
            effect: None,
            tags: SkillTags::empty(),
        }
    }

    pub fn with_cost(mut self, cost: ScaledAmount) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_upkeep(mut self, upkeep: ScaledAmount) -> Self {
        self.upkeep = upkeep;
        self
    }

    pub fn with_cooldown(mut self, cooldown: CooldownSpec) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = Some(effect.into());
        self
    }

    pub fn with_tags(mut self, tags: SkillTags) -> Self {
        self.tags = tags;
        self
    }

    pub fn cost_at(&self, tier: Tier) -> f64 {
        self.cost.at(tier)
    }

    pub fn upkeep_at(&self, tier: Tier) -> f64 {
        self.upkeep.at(tier)
    }

    /// Cooldown applied after a cast by an actor of the given tier.
    pub fn cooldown_ticks(&self, tier: Tier) -> u32 {
        self.cooldown.ticks_at(tier)
    }

    pub fn is_passive(&self) -> bool {
        self.cast_type.is_passive()
    }

    pub fn is_maintained(&self) -> bool {
        self.cast_type.is_maintained()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(value: u8) -> Tier {
        Tier::new(value).unwrap()
    }

    #[test]
    fn scaled_amount_grows_with_rank() {
        let cost = ScaledAmount::scaled(10.0, 2.0);
        assert_eq!(cost.at(tier(9)), 10.0);
        assert_eq!(cost.at(tier(7)), 14.0);
    }

    #[test]
    fn scaled_amount_never_negative() {
        let cost = ScaledAmount::scaled(5.0, -1.0);
        assert_eq!(cost.at(tier(0)), 0.0);
    }

    #[test]
    fn cooldown_respects_floor() {
        let cooldown = CooldownSpec {
            base_ticks: 100,
            per_rank_reduction: 20,
            min_ticks: 30,
        };
        assert_eq!(cooldown.ticks_at(tier(9)), 100);
        assert_eq!(cooldown.ticks_at(tier(8)), 80);
        assert_eq!(cooldown.ticks_at(tier(0)), 30);
    }

    #[test]
    fn deactivation_flag_only_matters_for_maintained_skills() {
        assert!(!CastType::Toggle { deactivatable: false }.can_be_deactivated());
        assert!(CastType::SummonMaintain { deactivatable: true }.can_be_deactivated());
        assert!(CastType::Instant.can_be_deactivated());
        assert_eq!(CastType::Chanting { chant_ticks: 40 }.kind().to_string(), "CHANTING");
    }
}
