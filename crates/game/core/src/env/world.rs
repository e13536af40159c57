//! Spatial queries against the host world.

use crate::geometry::{Aabb, BlockPos, Vec3};
use crate::state::ActorId;

/// Position and facing of an actor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    /// Feet position.
    pub position: Vec3,
    /// Unit look direction.
    pub look: Vec3,
    pub height: f64,
    pub eye_height: f64,
}

impl Pose {
    pub const DEFAULT_HEIGHT: f64 = 1.8;
    pub const DEFAULT_EYE_HEIGHT: f64 = 1.62;

    pub fn new(position: Vec3, look: Vec3) -> Self {
        Self {
            position,
            look,
            height: Self::DEFAULT_HEIGHT,
            eye_height: Self::DEFAULT_EYE_HEIGHT,
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.position + Vec3::new(0.0, self.eye_height, 0.0)
    }

    pub fn center(&self) -> Vec3 {
        self.position + Vec3::new(0.0, self.height * 0.5, 0.0)
    }

    /// Body points used by multi-point visibility checks: center, near feet, near head.
    pub fn sample_points(&self) -> [Vec3; 3] {
        [
            self.center(),
            self.position + Vec3::new(0.0, 0.1, 0.0),
            self.position + Vec3::new(0.0, self.height - 0.1, 0.0),
        ]
    }
}

/// Entity reported by a bounding-volume query.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldEntity {
    pub handle: u64,
    /// Entity type key, e.g. `minecraft:zombie`.
    pub kind: String,
    pub position: Vec3,
}

/// World access consumed by perception and divination.
pub trait WorldOracle: Send + Sync {
    fn pose(&self, actor: ActorId) -> Option<Pose>;

    /// Block type key at `pos`, or `None` for air and unloaded regions.
    fn block(&self, pos: BlockPos) -> Option<&str>;

    /// Whether the chunk holding `pos` is loaded. Unloaded regions are never scanned.
    fn is_loaded(&self, pos: BlockPos) -> bool;

    /// True when nothing solid lies strictly between the two points.
    fn ray_clear(&self, from: Vec3, to: Vec3) -> bool;

    fn entities_in(&self, area: &Aabb) -> Vec<WorldEntity>;

    /// Direct observer-to-target line of sight (eye to eye).
    fn line_of_sight(&self, observer: ActorId, target: ActorId) -> bool {
        match (self.pose(observer), self.pose(target)) {
            (Some(o), Some(t)) => self.ray_clear(o.eye(), t.eye()),
            _ => false,
        }
    }
}
