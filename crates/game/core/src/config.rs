/// Block-scan strategy used by divination searches.
///
/// Resolved once when the runtime builds its oracles; see
/// [`crate::divination::BlockScanStrategy`].
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
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ScanStrategyKind {
    /// Exhaustive box walk with squared-distance pruning.
    #[default]
    Grid,
    /// Expanding Chebyshev shells that stop once no closer match is possible.
    Shell,
}

/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Flat spirituality restored on every regen pulse (before the max-scaled part).
    pub base_regen: f64,

    /// Detection bonus per rank granted by an active enhanced-sight skill.
    pub sight_bonus_per_rank: f64,

    /// Half-angle of the observer's gaze cone, in degrees.
    pub gaze_fov_degrees: f64,
    /// Farthest distance at which a gaze can be felt.
    pub gaze_max_distance: f64,
    /// Required-tick values above this make a pair unconditionally unnoticeable.
    pub gaze_concealment_ceiling: u32,
    /// Minimum ticks between two alerts for the same (observer, target) pair.
    pub alert_cooldown_ticks: u64,
    /// Danger sense runs once every this many ticks.
    pub danger_sense_interval: u32,

    /// Horizontal search radius at the weakest tier.
    pub divination_base_horizontal: i32,
    /// Extra horizontal radius per rank.
    pub divination_horizontal_per_rank: i32,
    /// Vertical search radius at the weakest tier.
    pub divination_base_vertical: i32,
    /// Extra vertical radius per rank.
    pub divination_vertical_per_rank: i32,
    /// Continuous searches are repeated once every this many ticks.
    pub divination_interval: u32,
    /// Probability that a continuous-mode success grants one mastery point.
    pub continuous_mastery_chance: f64,
    pub scan_strategy: ScanStrategyKind,

    /// Resource changes smaller than this are not pushed to observers.
    pub sync_epsilon: f64,
    /// Unconditional state push cadence.
    pub heartbeat_interval: u32,
}

impl GameConfig {
    // ===== compile-time constants =====
    /// Weakest tier ("sequence 9"). Lower numbers are stronger.
    pub const MAX_TIER: u8 = 9;
    pub const MAX_PAGES: usize = 3;
    pub const SLOTS_PER_PAGE: usize = 9;
    pub const TICKS_PER_SECOND: u32 = 20;
    pub const REGEN_INTERVAL_TICKS: u32 = 20;
    pub const COMBAT_DURATION_TICKS: u32 = 10 * Self::TICKS_PER_SECOND;
    pub const COMBAT_REGEN_FACTOR: f64 = 0.1;
    pub const MAX_REGEN_FRACTION: f64 = 0.001;
    /// Anti-spam cooldown applied when a maintained skill is switched on.
    pub const TOGGLE_GUARD_TICKS: u32 = 10;
    pub const BASE_SPIRITUALITY: f64 = 100.0;
    pub const MAX_MASTERY: u32 = 1000;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_BASE_REGEN: f64 = 1.0;
    pub const DEFAULT_SIGHT_BONUS_PER_RANK: f64 = 2.0;
    pub const DEFAULT_GAZE_FOV_DEGREES: f64 = 15.0;
    pub const DEFAULT_GAZE_MAX_DISTANCE: f64 = 64.0;
    pub const DEFAULT_GAZE_CONCEALMENT_CEILING: u32 = 1200;
    pub const DEFAULT_ALERT_COOLDOWN_TICKS: u64 = 200;
    pub const DEFAULT_DANGER_SENSE_INTERVAL: u32 = 5;

    pub fn new() -> Self {
        Self {
            base_regen: Self::DEFAULT_BASE_REGEN,
            sight_bonus_per_rank: Self::DEFAULT_SIGHT_BONUS_PER_RANK,
            gaze_fov_degrees: Self::DEFAULT_GAZE_FOV_DEGREES,
            gaze_max_distance: Self::DEFAULT_GAZE_MAX_DISTANCE,
            gaze_concealment_ceiling: Self::DEFAULT_GAZE_CONCEALMENT_CEILING,
            alert_cooldown_ticks: Self::DEFAULT_ALERT_COOLDOWN_TICKS,
            danger_sense_interval: Self::DEFAULT_DANGER_SENSE_INTERVAL,
            divination_base_horizontal: 16,
            divination_horizontal_per_rank: 4,
            divination_base_vertical: 8,
            divination_vertical_per_rank: 2,
            divination_interval: 20,
            continuous_mastery_chance: 0.1,
            scan_strategy: ScanStrategyKind::Grid,
            sync_epsilon: 0.01,
            heartbeat_interval: 20,
        }
    }

    pub fn with_base_regen(mut self, base_regen: f64) -> Self {
        self.base_regen = base_regen;
        self
    }

    pub fn with_scan_strategy(mut self, scan_strategy: ScanStrategyKind) -> Self {
        self.scan_strategy = scan_strategy;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
