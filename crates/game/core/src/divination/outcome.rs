//! Randomized outcome table wrapped around the deterministic scan.
//!
//! Continuous mode never rolls: every call is a success, because
//! independent rolls would make sustained tracking statistically
//! impossible. It still stops the moment the scan finds nothing.

use crate::config::GameConfig;
use crate::divination::{
    BlockScanStrategy, DivinationQuery, SearchVolume, TargetKind, find_nearest_entity,
};
use crate::env::{RngOracle, WorldOracle, compute_seed, rng_context};
use crate::geometry::{BlockPos, Vec3};
use crate::state::{ActorId, Tier};

/// Result of the chance roll.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DivinationOutcome {
    Success,
    /// A fabricated location inside the search volume.
    Misleading,
    /// Hard failure, no location.
    Backfire,
    Failure,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchMode {
    Single,
    Continuous,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Compass {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Compass {
    /// Direction of a horizontal offset; north is −z, east is +x.
    pub fn from_offset(dx: f64, dz: f64) -> Self {
        const ORDER: [Compass; 8] = [
            Compass::North,
            Compass::NorthEast,
            Compass::East,
            Compass::SouthEast,
            Compass::South,
            Compass::SouthWest,
            Compass::West,
            Compass::NorthWest,
        ];
        let degrees = dx.atan2(-dz).to_degrees().rem_euclid(360.0);
        let index = ((degrees + 22.5) / 45.0).floor() as usize % 8;
        ORDER[index]
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Vertical {
    Above,
    Level,
    Below,
}

/// Feedback shown to the diviner.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectionHint {
    pub compass: Compass,
    pub vertical: Vertical,
    pub distance: f64,
}

impl DirectionHint {
    /// Vertical offsets within this many blocks read as level.
    pub const LEVEL_BAND: f64 = 2.0;

    pub fn between(origin: Vec3, target: Vec3) -> Self {
        let offset = target - origin;
        let vertical = if offset.y > Self::LEVEL_BAND {
            Vertical::Above
        } else if offset.y < -Self::LEVEL_BAND {
            Vertical::Below
        } else {
            Vertical::Level
        };
        Self {
            compass: Compass::from_offset(offset.x, offset.z),
            vertical,
            distance: offset.length(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DivinationResult {
    Found { position: Vec3, hint: DirectionHint },
    /// Looks like a find; the position is made up.
    Misled { position: Vec3, hint: DirectionHint },
    Backfire,
    Failure,
    /// The roll succeeded but nothing matches in range. Terminal.
    NotFound,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DivinationReport {
    pub outcome: DivinationOutcome,
    pub result: DivinationResult,
    pub chance: f64,
    pub mastery_gain: u32,
    /// A continuous search must end.
    pub stop: bool,
}

/// `0.6 + 0.05 × rank + 0.2 × mastery / MAX_MASTERY − difficulty / 100`.
pub fn success_chance(tier: Tier, mastery: u32, difficulty: f64) -> f64 {
    0.6 + tier.rank() as f64 * 0.05
        + (mastery.min(GameConfig::MAX_MASTERY) as f64 / GameConfig::MAX_MASTERY as f64) * 0.2
        - difficulty / 100.0
}

/// Maps a uniform roll to an outcome band.
pub fn roll_outcome(chance: f64, roll: f64) -> DivinationOutcome {
    if roll < chance {
        DivinationOutcome::Success
    } else if roll < chance + 0.15 {
        DivinationOutcome::Misleading
    } else if roll < chance + 0.25 {
        DivinationOutcome::Backfire
    } else {
        DivinationOutcome::Failure
    }
}

/// Who is searching and from where.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Diviner {
    pub actor: ActorId,
    pub origin: Vec3,
    pub tier: Tier,
    pub mastery: u32,
}

pub struct DivinationSearch<'a> {
    world: &'a dyn WorldOracle,
    rng: &'a dyn RngOracle,
    strategy: &'a dyn BlockScanStrategy,
    config: &'a GameConfig,
    game_seed: u64,
}

impl<'a> DivinationSearch<'a> {
    pub fn new(
        world: &'a dyn WorldOracle,
        rng: &'a dyn RngOracle,
        strategy: &'a dyn BlockScanStrategy,
        config: &'a GameConfig,
        game_seed: u64,
    ) -> Self {
        Self {
            world,
            rng,
            strategy,
            config,
            game_seed,
        }
    }

    fn seed(&self, diviner: &Diviner, tick: u64, context: u32) -> u64 {
        compute_seed(self.game_seed, tick, diviner.actor.0, context)
    }

    /// Nearest match in the diviner's volume, as a world position.
    pub fn scan(&self, volume: &SearchVolume, query: &DivinationQuery) -> Option<Vec3> {
        match query.kind {
            TargetKind::Block => self
                .strategy
                .find_nearest(self.world, volume, &query.target)
                .map(BlockPos::center),
            TargetKind::Entity => {
                find_nearest_entity(self.world, volume, &query.target).map(|e| e.position)
            }
        }
    }

    fn decoy(&self, diviner: &Diviner, volume: &SearchVolume, tick: u64) -> Vec3 {
        let seed = self.seed(diviner, tick, rng_context::DIVINATION_DECOY);
        let (h, v) = (volume.horizontal, volume.vertical);
        volume
            .center
            .offset(
                self.rng.range_i32(seed, -h, h),
                self.rng.range_i32(seed.wrapping_add(1), -v, v),
                self.rng.range_i32(seed.wrapping_add(2), -h, h),
            )
            .center()
    }

    pub fn search(
        &self,
        diviner: &Diviner,
        query: &DivinationQuery,
        mode: SearchMode,
        tick: u64,
    ) -> DivinationReport {
        let volume = SearchVolume::for_tier(diviner.origin.block(), diviner.tier, self.config);
        let chance = success_chance(diviner.tier, diviner.mastery, query.difficulty);
        let outcome = match mode {
            SearchMode::Continuous => DivinationOutcome::Success,
            SearchMode::Single => roll_outcome(
                chance,
                self.rng
                    .unit(self.seed(diviner, tick, rng_context::DIVINATION_OUTCOME)),
            ),
        };

        let result = match outcome {
            DivinationOutcome::Success => match self.scan(&volume, query) {
                Some(position) => DivinationResult::Found {
                    position,
                    hint: DirectionHint::between(diviner.origin, position),
                },
                None => DivinationResult::NotFound,
            },
            DivinationOutcome::Misleading => {
                let position = self.decoy(diviner, &volume, tick);
                DivinationResult::Misled {
                    position,
                    hint: DirectionHint::between(diviner.origin, position),
                }
            }
            DivinationOutcome::Backfire => DivinationResult::Backfire,
            DivinationOutcome::Failure => DivinationResult::Failure,
        };

        let rewarded = matches!(
            result,
            DivinationResult::Found { .. } | DivinationResult::Misled { .. }
        );
        let mastery_gain = match (rewarded, mode) {
            (false, _) => 0,
            (true, SearchMode::Single) => self.rng.range(
                self.seed(diviner, tick, rng_context::DIVINATION_MASTERY),
                1,
                3,
            ),
            (true, SearchMode::Continuous) => {
                let roll = self
                    .rng
                    .unit(self.seed(diviner, tick, rng_context::CONTINUOUS_MASTERY));
                u32::from(roll < self.config.continuous_mastery_chance)
            }
        };

        DivinationReport {
            outcome,
            stop: matches!(result, DivinationResult::NotFound),
            result,
            chance,
            mastery_gain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::divination::{GridScan, ShellScan};
    use crate::env::{FixedRng, PcgRng};
    use crate::testing::TestWorld;

    fn tier(value: u8) -> Tier {
        Tier::new(value).unwrap()
    }

    fn diviner() -> Diviner {
        Diviner {
            actor: ActorId(1),
            origin: Vec3::new(0.5, 0.0, 0.5),
            tier: tier(9),
            mastery: 0,
        }
    }

    #[test]
    fn chance_formula() {
        assert!((success_chance(tier(9), 0, 0.0) - 0.6).abs() < 1e-12);
        assert!((success_chance(tier(7), 500, 10.0) - 0.7).abs() < 1e-12);
        assert!((success_chance(tier(0), 1000, 0.0) - 1.25).abs() < 1e-12);
    }

    #[test]
    fn outcome_bands() {
        assert_eq!(roll_outcome(0.6, 0.5), DivinationOutcome::Success);
        assert_eq!(roll_outcome(0.6, 0.7), DivinationOutcome::Misleading);
        assert_eq!(roll_outcome(0.6, 0.8), DivinationOutcome::Backfire);
        assert_eq!(roll_outcome(0.6, 0.9), DivinationOutcome::Failure);
    }

    #[test]
    fn success_without_match_stops_the_loop() {
        let world = TestWorld::default();
        let rng = FixedRng::with_unit(0.5);
        let config = GameConfig::default();
        let search = DivinationSearch::new(&world, &rng, &GridScan, &config, 7);
        let query = DivinationQuery::block("minecraft:diamond_ore");

        let single = search.search(&diviner(), &query, SearchMode::Single, 1);
        assert_eq!(single.outcome, DivinationOutcome::Success);
        assert_eq!(single.result, DivinationResult::NotFound);
        assert!(single.stop);
        assert_eq!(single.mastery_gain, 0);

        let continuous = search.search(&diviner(), &query, SearchMode::Continuous, 2);
        assert!(continuous.stop);
    }

    #[test]
    fn continuous_mode_never_rolls() {
        let mut world = TestWorld::default();
        world.set_block(BlockPos::new(3, 0, -4), "minecraft:diamond_ore");
        // a roll this high would be a Failure in single mode
        let rng = FixedRng::with_unit(0.99);
        let config = GameConfig::default();
        let search = DivinationSearch::new(&world, &rng, &ShellScan, &config, 7);
        let query = DivinationQuery::block("minecraft:diamond_ore");

        let single = search.search(&diviner(), &query, SearchMode::Single, 1);
        assert_eq!(single.outcome, DivinationOutcome::Failure);

        let report = search.search(&diviner(), &query, SearchMode::Continuous, 1);
        assert_eq!(report.outcome, DivinationOutcome::Success);
        assert!(!report.stop);
        let DivinationResult::Found { position, hint } = report.result else {
            panic!("expected a find, got {:?}", report.result);
        };
        assert_eq!(position, Vec3::new(3.5, 0.5, -3.5));
        assert_eq!(hint.compass, Compass::NorthEast);
        assert_eq!(hint.vertical, Vertical::Level);
        // 0.99 is above the continuous mastery chance
        assert_eq!(report.mastery_gain, 0);
    }

    #[test]
    fn misleading_location_stays_in_volume() {
        let world = TestWorld::default();
        let config = GameConfig::default();
        let query = DivinationQuery::block("minecraft:diamond_ore");
        let volume = SearchVolume::for_tier(diviner().origin.block(), tier(9), &config);
        for seed in 0..50u64 {
            let rng = PcgRng;
            let search = DivinationSearch::new(&world, &rng, &GridScan, &config, seed);
            let report = search.search(&diviner(), &query, SearchMode::Single, seed);
            if let DivinationResult::Misled { position, .. } = report.result {
                assert!(volume.contains(position.block()));
                assert!((1..=3).contains(&report.mastery_gain));
            }
        }
    }

    #[test]
    fn compass_points() {
        assert_eq!(Compass::from_offset(0.0, -5.0), Compass::North);
        assert_eq!(Compass::from_offset(5.0, 0.0), Compass::East);
        assert_eq!(Compass::from_offset(0.0, 5.0), Compass::South);
        assert_eq!(Compass::from_offset(-5.0, 0.0), Compass::West);
        assert_eq!(Compass::from_offset(-3.0, 3.0), Compass::SouthWest);
    }

    #[test]
    fn single_success_grants_mastery() {
        let mut world = TestWorld::default();
        world.set_block(BlockPos::new(1, 1, 1), "minecraft:chest");
        let rng = FixedRng::with_unit(0.1);
        let config = GameConfig::default();
        let search = DivinationSearch::new(&world, &rng, &GridScan, &config, 0);
        let report = search.search(
            &diviner(),
            &DivinationQuery::block("minecraft:chest"),
            SearchMode::Single,
            3,
        );
        assert!(matches!(report.result, DivinationResult::Found { .. }));
        assert!((1..=3).contains(&report.mastery_gain));
    }
}
