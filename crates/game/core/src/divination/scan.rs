//! Bounded nearest-match searches.
//!
//! Both block strategies return the same answer: the matching block with
//! the smallest squared distance to the volume center, ties broken by
//! coordinate order. Unloaded positions are treated as "no match" and are
//! never read.

use crate::config::{GameConfig, ScanStrategyKind};
use crate::env::{WorldEntity, WorldOracle};
use crate::geometry::{Aabb, BlockPos};
use crate::state::Tier;

/// Box around the searcher, scaled by tier rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchVolume {
    pub center: BlockPos,
    pub horizontal: i32,
    pub vertical: i32,
}

impl SearchVolume {
    pub fn new(center: BlockPos, horizontal: i32, vertical: i32) -> Self {
        Self {
            center,
            horizontal: horizontal.max(0),
            vertical: vertical.max(0),
        }
    }

    pub fn for_tier(center: BlockPos, tier: Tier, config: &GameConfig) -> Self {
        let rank = tier.rank() as i32;
        Self::new(
            center,
            config.divination_base_horizontal + rank * config.divination_horizontal_per_rank,
            config.divination_base_vertical + rank * config.divination_vertical_per_rank,
        )
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        (pos.x - self.center.x).abs() <= self.horizontal
            && (pos.y - self.center.y).abs() <= self.vertical
            && (pos.z - self.center.z).abs() <= self.horizontal
    }

    /// World-space bounds covering every block of the volume.
    pub fn bounds(&self) -> Aabb {
        Aabb::around(
            self.center.center(),
            self.horizontal as f64 + 0.5,
            self.vertical as f64 + 0.5,
        )
    }
}

/// Pluggable block search, chosen once from configuration.
pub trait BlockScanStrategy: Send + Sync {
    fn kind(&self) -> ScanStrategyKind;

    fn find_nearest(
        &self,
        world: &dyn WorldOracle,
        volume: &SearchVolume,
        block: &str,
    ) -> Option<BlockPos>;
}

/// Keeps the nearest candidate, breaking distance ties by position.
#[derive(Default)]
struct Nearest {
    best: Option<(i64, BlockPos)>,
}

impl Nearest {
    fn distance_limit(&self) -> Option<i64> {
        self.best.map(|(d, _)| d)
    }

    fn offer(&mut self, distance: i64, pos: BlockPos) {
        let better = match self.best {
            None => true,
            Some((d, p)) => distance < d || (distance == d && pos < p),
        };
        if better {
            self.best = Some((distance, pos));
        }
    }
}

fn probe(world: &dyn WorldOracle, pos: BlockPos, block: &str) -> bool {
    world.is_loaded(pos) && world.block(pos) == Some(block)
}

/// Exhaustive walk over the whole box, skipping positions already farther
/// than the best match.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridScan;

impl BlockScanStrategy for GridScan {
    fn kind(&self) -> ScanStrategyKind {
        ScanStrategyKind::Grid
    }

    fn find_nearest(
        &self,
        world: &dyn WorldOracle,
        volume: &SearchVolume,
        block: &str,
    ) -> Option<BlockPos> {
        let (h, v) = (volume.horizontal, volume.vertical);
        let mut nearest = Nearest::default();
        for dx in -h..=h {
            for dy in -v..=v {
                for dz in -h..=h {
                    let pos = volume.center.offset(dx, dy, dz);
                    let distance = volume.center.distance_squared(pos);
                    if nearest.distance_limit().is_some_and(|limit| distance > limit) {
                        continue;
                    }
                    if probe(world, pos, block) {
                        nearest.offer(distance, pos);
                    }
                }
            }
        }
        nearest.best.map(|(_, pos)| pos)
    }
}

/// Expanding Chebyshev shells around the center; stops as soon as no
/// farther shell can hold a closer match.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShellScan;

impl BlockScanStrategy for ShellScan {
    fn kind(&self) -> ScanStrategyKind {
        ScanStrategyKind::Shell
    }

    fn find_nearest(
        &self,
        world: &dyn WorldOracle,
        volume: &SearchVolume,
        block: &str,
    ) -> Option<BlockPos> {
        let (h, v) = (volume.horizontal, volume.vertical);
        let mut nearest = Nearest::default();
        for radius in 0..=h.max(v) {
            for_each_in_shell(volume, radius, |pos| {
                if probe(world, pos, block) {
                    nearest.offer(volume.center.distance_squared(pos), pos);
                }
            });
            // every block in the next shell is at least radius + 1 away
            let next = (radius as i64 + 1).pow(2);
            if nearest.distance_limit().is_some_and(|limit| limit < next) {
                break;
            }
        }
        nearest.best.map(|(_, pos)| pos)
    }
}

/// Visits every block of the volume at Chebyshev distance `radius` from the
/// center exactly once.
fn for_each_in_shell(volume: &SearchVolume, radius: i32, mut visit: impl FnMut(BlockPos)) {
    let xr = radius.min(volume.horizontal);
    let yr = radius.min(volume.vertical);
    // the two z faces exist only while the shell is inside the box
    let z_faces: &[i32] = if radius <= volume.horizontal {
        &[-radius, radius]
    } else {
        &[]
    };
    for dx in -xr..=xr {
        for dy in -yr..=yr {
            if dx.abs() == radius || dy.abs() == radius {
                for dz in -xr..=xr {
                    visit(volume.center.offset(dx, dy, dz));
                }
            } else {
                for &dz in z_faces {
                    visit(volume.center.offset(dx, dy, dz));
                }
            }
        }
    }
}

/// Resolves the configured strategy.
pub fn strategy_for(kind: ScanStrategyKind) -> Box<dyn BlockScanStrategy> {
    match kind {
        ScanStrategyKind::Grid => Box::new(GridScan),
        ScanStrategyKind::Shell => Box::new(ShellScan),
    }
}

/// Nearest entity of type `kind` inside the volume bounds.
pub fn find_nearest_entity(
    world: &dyn WorldOracle,
    volume: &SearchVolume,
    kind: &str,
) -> Option<WorldEntity> {
    let origin = volume.center.center();
    world
        .entities_in(&volume.bounds())
        .into_iter()
        .filter(|entity| entity.kind == kind && world.is_loaded(entity.position.block()))
        .min_by(|a, b| {
            origin
                .distance(a.position)
                .total_cmp(&origin.distance(b.position))
                .then(a.handle.cmp(&b.handle))
        })
}
