//! Perception: the detection contest and its consumers.
mod contest;
mod danger;
mod gaze;
mod threat;

pub use contest::{PerceptionEvaluator, can_perceive, sight_bonus};
pub use danger::{DangerSense, GazeAlert, in_cone, is_visible, required_ticks};
pub use gaze::{GazeBook, GazeTracker, PairKey};
pub use threat::{
    ThreatLevel, ThreatObserver, ThreatSubject, beyonder_threat, creature_threat, evaluate,
};
