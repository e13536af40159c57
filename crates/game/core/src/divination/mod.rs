//! Divination: locating blocks and entities around the diviner.
mod outcome;
mod query;
mod scan;

pub use outcome::{
    Compass, DirectionHint, DivinationOutcome, DivinationReport, DivinationResult,
    DivinationSearch, Diviner, SearchMode, Vertical, roll_outcome, success_chance,
};
pub use query::{DivinationCarrier, DivinationQuery, TargetKind};
pub use scan::{
    BlockScanStrategy, GridScan, SearchVolume, ShellScan, find_nearest_entity, strategy_for,
};
