//! Shared fixtures for unit tests.

use std::collections::{BTreeMap, BTreeSet};

use crate::env::{
    AttributeOracle, Attributes, PathwayDefinition, PathwayRegistry, Pose, SkillRegistry, TierRow,
    WorldEntity, WorldOracle,
};
use crate::geometry::{Aabb, BlockPos, Vec3};
use crate::skill::{CastType, CooldownSpec, ScaledAmount, SkillDefinition, SkillTags};
use crate::state::{ActorFlags, ActorId, ActorState, PathwayId, SkillId, Tier};

pub const SPIRIT_VISION: &str = "seer:spirit_vision";
pub const MIND_READ: &str = "seer:mind_read";
pub const DANGER_SENSE: &str = "seer:danger_sense";
pub const DIVINATION: &str = "seer:divination";
pub const PAPER_SUBSTITUTE: &str = "seer:paper_substitute";
pub const SPIRIT_BODY: &str = "seer:spirit_body";
pub const AIR_BULLET: &str = "seer:air_bullet";

pub fn id(raw: &str) -> SkillId {
    SkillId::new(raw).unwrap()
}

pub fn seer() -> PathwayId {
    PathwayId::new("lotm:seer").unwrap()
}

pub fn skills() -> SkillRegistry {
    SkillRegistry::from_definitions([
        SkillDefinition::new(id(SPIRIT_VISION), CastType::Toggle { deactivatable: true })
            .with_cost(ScaledAmount::flat(10.0))
            .with_upkeep(ScaledAmount::flat(0.5))
            .with_cooldown(CooldownSpec::fixed(60))
            .with_tags(SkillTags::ENHANCED_SIGHT),
        SkillDefinition::new(id(MIND_READ), CastType::Instant)
            .with_cost(ScaledAmount::flat(10.0))
            .with_cooldown(CooldownSpec::fixed(60)),
        SkillDefinition::new(id(DANGER_SENSE), CastType::Passive)
            .with_tags(SkillTags::DANGER_SENSE),
        SkillDefinition::new(id(DIVINATION), CastType::Instant)
            .with_cost(ScaledAmount::flat(15.0))
            .with_cooldown(CooldownSpec::fixed(100))
            .with_effect("divination")
            .with_tags(SkillTags::DIVINATION),
        SkillDefinition::new(
            id(PAPER_SUBSTITUTE),
            CastType::Charging {
                max_charge_ticks: 40,
            },
        )
        .with_cost(ScaledAmount::flat(20.0))
        .with_cooldown(CooldownSpec {
            base_ticks: 100,
            per_rank_reduction: 10,
            min_ticks: 20,
        }),
        SkillDefinition::new(id(SPIRIT_BODY), CastType::Toggle { deactivatable: false })
            .with_cost(ScaledAmount::flat(30.0))
            .with_upkeep(ScaledAmount::flat(0.1)),
        SkillDefinition::new(id(AIR_BULLET), CastType::Instant)
            .with_cost(ScaledAmount::scaled(8.0, 1.0))
            .with_cooldown(CooldownSpec::fixed(20))
            .with_effect("air_bullet")
            .with_tags(SkillTags::HOSTILE),
    ])
    .unwrap()
}

fn tier(value: u8) -> Tier {
    Tier::new(value).unwrap()
}

pub fn pathways() -> PathwayRegistry {
    let seer = PathwayDefinition::new(seer(), "Seer")
        .with_tier(
            TierRow::new(tier(9))
                .with_spirituality_bonus(50.0)
                .with_perception(2.0, 0.0)
                .with_skills([id(SPIRIT_VISION), id(MIND_READ)]),
        )
        .with_tier(
            TierRow::new(tier(8))
                .with_spirituality_bonus(80.0)
                .with_perception(4.0, 1.0)
                .with_gaze_base_ticks(90)
                .with_skills([id(DANGER_SENSE)]),
        )
        .with_tier(
            TierRow::new(tier(7))
                .with_spirituality_bonus(120.0)
                .with_perception(6.0, 2.0)
                .with_gaze_base_ticks(80)
                .with_skills([id(DIVINATION), id(PAPER_SUBSTITUTE), id(SPIRIT_BODY)]),
        )
        .with_tier(
            TierRow::new(tier(6))
                .with_spirituality_bonus(160.0)
                .with_perception(8.0, 3.0)
                .with_gaze_base_ticks(70),
        )
        .with_tier(
            TierRow::new(tier(5))
                .with_spirituality_bonus(200.0)
                .with_perception(10.0, 4.0)
                .with_gaze_base_ticks(60)
                .with_skills([id(AIR_BULLET)]),
        );
    let skills = skills();
    PathwayRegistry::from_definitions([seer], &skills).unwrap()
}

/// A Seer Beyonder at `tier` with a full pool and nothing learned.
pub fn beyonder(actor: u32, tier_value: u8, pathways: &PathwayRegistry) -> ActorState {
    let mut state = ActorState::new(ActorId(actor)).with_flags(ActorFlags::BEYONDER);
    state
        .resource
        .set_progression(Some(seer()), tier(tier_value));
    state.resource.fill(pathways);
    state
}

#[derive(Clone, Debug, Default)]
pub struct TestAttributes {
    table: BTreeMap<ActorId, Attributes>,
}

impl TestAttributes {
    pub fn insert(&mut self, actor: ActorId, attributes: Attributes) {
        self.table.insert(actor, attributes);
    }
}

impl AttributeOracle for TestAttributes {
    fn attributes(&self, actor: ActorId) -> Option<Attributes> {
        self.table.get(&actor).cloned()
    }
}

/// Everything loaded, nothing solid, no blocks until placed.
#[derive(Clone, Debug, Default)]
pub struct TestWorld {
    poses: BTreeMap<ActorId, Pose>,
    blocks: BTreeMap<BlockPos, String>,
    unloaded: BTreeSet<BlockPos>,
    blocked: Vec<Vec3>,
    entities: Vec<WorldEntity>,
}

impl TestWorld {
    pub fn set_pose(&mut self, actor: ActorId, pose: Pose) {
        self.poses.insert(actor, pose);
    }

    /// Every ray ending exactly at `point` is obstructed.
    pub fn block_rays_to(&mut self, point: Vec3) {
        self.blocked.push(point);
    }

    pub fn set_block(&mut self, pos: BlockPos, kind: &str) {
        self.blocks.insert(pos, kind.to_owned());
    }

    pub fn unload(&mut self, pos: BlockPos) {
        self.unloaded.insert(pos);
    }

    pub fn spawn(&mut self, handle: u64, kind: &str, position: Vec3) {
        self.entities.push(WorldEntity {
            handle,
            kind: kind.to_owned(),
            position,
        });
    }
}

impl WorldOracle for TestWorld {
    fn pose(&self, actor: ActorId) -> Option<Pose> {
        self.poses.get(&actor).copied()
    }

    fn block(&self, pos: BlockPos) -> Option<&str> {
        if self.unloaded.contains(&pos) {
            return None;
        }
        self.blocks.get(&pos).map(String::as_str)
    }

    fn is_loaded(&self, pos: BlockPos) -> bool {
        !self.unloaded.contains(&pos)
    }

    fn ray_clear(&self, _from: Vec3, to: Vec3) -> bool {
        !self.blocked.contains(&to)
    }

    fn entities_in(&self, area: &Aabb) -> Vec<WorldEntity> {
        self.entities
            .iter()
            .filter(|entity| area.contains(entity.position))
            .cloned()
            .collect()
    }
}
