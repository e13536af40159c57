//! Sparse block world served through [`beyonder_core::WorldOracle`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use beyonder_core::{ActorId, Aabb, BlockPos, Pose, Vec3, WorldEntity, WorldOracle};

/// Ray samples per block of distance.
const RAY_SAMPLES_PER_BLOCK: f64 = 4.0;

/// Sparse voxel world: unset positions are air.
///
/// Every block kind is opaque to rays unless marked transparent. An
/// optional loaded area models chunk streaming; outside it the world
/// reports nothing.
#[derive(Clone, Debug, Default)]
pub struct GridWorld {
    poses: BTreeMap<ActorId, Pose>,
    blocks: HashMap<BlockPos, String>,
    transparent: BTreeSet<String>,
    loaded: Option<Aabb>,
    entities: BTreeMap<u64, WorldEntity>,
}

impl GridWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the loaded region. `None` loads everything.
    pub fn set_loaded_area(&mut self, area: Option<Aabb>) {
        self.loaded = area;
    }

    pub fn mark_transparent(&mut self, kind: impl Into<String>) {
        self.transparent.insert(kind.into());
    }

    /// Places the actor, or removes it from the world with `None`.
    pub fn set_pose(&mut self, actor: ActorId, pose: Option<Pose>) -> Option<Pose> {
        match pose {
            Some(pose) => self.poses.insert(actor, pose),
            None => self.poses.remove(&actor),
        }
    }

    /// Sets or clears (with `None`) one block, returning the previous kind.
    pub fn set_block(&mut self, pos: BlockPos, kind: Option<String>) -> Option<String> {
        match kind {
            Some(kind) => self.blocks.insert(pos, kind),
            None => self.blocks.remove(&pos),
        }
    }

    /// Fills the inclusive box between two corners with one kind.
    pub fn fill(&mut self, from: BlockPos, to: BlockPos, kind: &str) -> usize {
        let (min, max) = (
            BlockPos::new(from.x.min(to.x), from.y.min(to.y), from.z.min(to.z)),
            BlockPos::new(from.x.max(to.x), from.y.max(to.y), from.z.max(to.z)),
        );
        let mut placed = 0;
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    self.blocks.insert(BlockPos::new(x, y, z), kind.to_owned());
                    placed += 1;
                }
            }
        }
        placed
    }

    pub fn spawn(&mut self, entity: WorldEntity) -> Option<WorldEntity> {
        self.entities.insert(entity.handle, entity)
    }

    pub fn despawn(&mut self, handle: u64) -> Option<WorldEntity> {
        self.entities.remove(&handle)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn is_opaque(&self, pos: BlockPos) -> bool {
        self.blocks
            .get(&pos)
            .is_some_and(|kind| !self.transparent.contains(kind))
    }
}

impl WorldOracle for GridWorld {
    fn pose(&self, actor: ActorId) -> Option<Pose> {
        self.poses.get(&actor).copied()
    }

    fn block(&self, pos: BlockPos) -> Option<&str> {
        if !self.is_loaded(pos) {
            return None;
        }
        self.blocks.get(&pos).map(String::as_str)
    }

    fn is_loaded(&self, pos: BlockPos) -> bool {
        self.loaded.is_none_or(|area| area.contains(pos.center()))
    }

    /// Samples the segment and fails on the first opaque block strictly
    /// between the end points' blocks.
    fn ray_clear(&self, from: Vec3, to: Vec3) -> bool {
        let (start, end) = (from.block(), to.block());
        let steps = (from.distance(to) * RAY_SAMPLES_PER_BLOCK).ceil().max(1.0) as u32;
        let delta = to - from;
        (1..steps).all(|step| {
            let pos = (from + delta * (f64::from(step) / f64::from(steps))).block();
            pos == start || pos == end || !self.is_opaque(pos)
        })
    }

    fn entities_in(&self, area: &Aabb) -> Vec<WorldEntity> {
        self.entities
            .values()
            .filter(|entity| area.contains(entity.position))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_block_rays_but_glass_does_not() {
        let mut world = GridWorld::new();
        world.fill(BlockPos::new(2, 0, -1), BlockPos::new(2, 3, 1), "minecraft:stone");
        let from = Vec3::new(0.5, 1.5, 0.5);
        let to = Vec3::new(5.5, 1.5, 0.5);
        assert!(!world.ray_clear(from, to));

        world.fill(BlockPos::new(2, 0, -1), BlockPos::new(2, 3, 1), "minecraft:glass");
        world.mark_transparent("minecraft:glass");
        assert!(world.ray_clear(from, to));
    }

    #[test]
    fn standing_inside_a_block_does_not_block_own_ray() {
        let mut world = GridWorld::new();
        world.set_block(BlockPos::new(0, 1, 0), Some("minecraft:cobweb".to_owned()));
        assert!(world.ray_clear(Vec3::new(0.5, 1.5, 0.5), Vec3::new(3.5, 1.5, 0.5)));
    }

    #[test]
    fn unloaded_positions_report_nothing() {
        let mut world = GridWorld::new();
        world.set_block(BlockPos::new(10, 0, 0), Some("minecraft:iron_ore".to_owned()));
        world.set_loaded_area(Some(Aabb::around(Vec3::ZERO, 4.0, 4.0)));
        assert!(!world.is_loaded(BlockPos::new(10, 0, 0)));
        assert_eq!(world.block(BlockPos::new(10, 0, 0)), None);

        world.set_loaded_area(None);
        assert_eq!(world.block(BlockPos::new(10, 0, 0)), Some("minecraft:iron_ore"));
    }

    #[test]
    fn entities_are_filtered_by_area() {
        let mut world = GridWorld::new();
        world.spawn(WorldEntity {
            handle: 1,
            kind: "minecraft:zombie".to_owned(),
            position: Vec3::new(1.0, 0.0, 1.0),
        });
        world.spawn(WorldEntity {
            handle: 2,
            kind: "minecraft:zombie".to_owned(),
            position: Vec3::new(40.0, 0.0, 1.0),
        });
        let found = world.entities_in(&Aabb::around(Vec3::ZERO, 8.0, 8.0));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].handle, 1);
        assert!(world.despawn(2).is_some());
        assert_eq!(world.entity_count(), 1);
    }
}
