//! Pathway progression tables.
//!
//! A pathway lists one row per tier it supports. Each row carries the
//! spirituality bonus, the perception bonuses, the danger-sense base delay
//! and the skills unlocked at that tier.

use std::collections::BTreeMap;

use super::{RegistryError, SkillOracle};
use crate::state::{PathwayId, SkillId, Tier};

/// Per-tier progression data of a pathway.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TierRow {
    pub tier: Tier,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spirituality_bonus: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub detection_bonus: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub concealment_bonus: f64,
    /// Gaze ticks a watcher needs before a bearer of danger sense notices.
    #[cfg_attr(feature = "serde", serde(default = "TierRow::default_gaze_ticks"))]
    pub gaze_base_ticks: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills: Vec<SkillId>,
}

impl TierRow {
    pub const DEFAULT_GAZE_BASE_TICKS: u32 = 100;

    pub fn new(tier: Tier) -> Self {
        Self {
            tier,
            spirituality_bonus: 0.0,
            detection_bonus: 0.0,
            concealment_bonus: 0.0,
            gaze_base_ticks: Self::DEFAULT_GAZE_BASE_TICKS,
            skills: Vec::new(),
        }
    }

    #[cfg(feature = "serde")]
    fn default_gaze_ticks() -> u32 {
        Self::DEFAULT_GAZE_BASE_TICKS
    }

    pub fn with_spirituality_bonus(mut self, bonus: f64) -> Self {
        self.spirituality_bonus = bonus;
        self
    }

    pub fn with_perception(mut self, detection: f64, concealment: f64) -> Self {
        self.detection_bonus = detection;
        self.concealment_bonus = concealment;
        self
    }

    pub fn with_gaze_base_ticks(mut self, ticks: u32) -> Self {
        self.gaze_base_ticks = ticks;
        self
    }

    pub fn with_skills(mut self, skills: impl IntoIterator<Item = SkillId>) -> Self {
        self.skills = skills.into_iter().collect();
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathwayDefinition {
    pub id: PathwayId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    pub tiers: Vec<TierRow>,
}

impl PathwayDefinition {
    pub fn new(id: PathwayId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tiers: Vec::new(),
        }
    }

    pub fn with_tier(mut self, row: TierRow) -> Self {
        self.tiers.push(row);
        self
    }

    pub fn row(&self, tier: Tier) -> Option<&TierRow> {
        self.tiers.iter().find(|row| row.tier == tier)
    }

    /// Skills listed at `tier` or any weaker tier (numerically greater or equal).
    pub fn skills_unlocked_at(&self, tier: Tier) -> Vec<SkillId> {
        let mut rows: Vec<&TierRow> = self.tiers.iter().filter(|row| row.tier >= tier).collect();
        rows.sort_by(|a, b| b.tier.cmp(&a.tier));
        let mut skills = Vec::new();
        for row in rows {
            for skill in &row.skills {
                if !skills.contains(skill) {
                    skills.push(skill.clone());
                }
            }
        }
        skills
    }
}

/// Read-only access to pathway progression.
pub trait ProgressionOracle: Send + Sync {
    fn pathway(&self, id: &PathwayId) -> Option<&PathwayDefinition>;

    fn row(&self, id: &PathwayId, tier: Tier) -> Option<&TierRow> {
        self.pathway(id).and_then(|pathway| pathway.row(tier))
    }

    /// Extra maximum spirituality; zero for unknown pathways or tiers.
    fn spirituality_bonus(&self, id: &PathwayId, tier: Tier) -> f64 {
        self.row(id, tier).map_or(0.0, |row| row.spirituality_bonus)
    }

    fn detection_bonus(&self, id: &PathwayId, tier: Tier) -> f64 {
        self.row(id, tier).map_or(0.0, |row| row.detection_bonus)
    }

    fn concealment_bonus(&self, id: &PathwayId, tier: Tier) -> f64 {
        self.row(id, tier).map_or(0.0, |row| row.concealment_bonus)
    }

    fn gaze_base_ticks(&self, id: &PathwayId, tier: Tier) -> u32 {
        self.row(id, tier)
            .map_or(TierRow::DEFAULT_GAZE_BASE_TICKS, |row| row.gaze_base_ticks)
    }
}

/// Append-only table of pathways.
#[derive(Clone, Debug, Default)]
pub struct PathwayRegistry {
    pathways: BTreeMap<PathwayId, PathwayDefinition>,
}

impl PathwayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every pathway and checks that unlocked skills exist in `skills`.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = PathwayDefinition>,
        skills: &dyn SkillOracle,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(definition, skills)?;
        }
        Ok(registry)
    }

    pub fn register(
        &mut self,
        definition: PathwayDefinition,
        skills: &dyn SkillOracle,
    ) -> Result<(), RegistryError> {
        if self.pathways.contains_key(&definition.id) {
            return Err(RegistryError::DuplicatePathway(definition.id));
        }
        for (index, row) in definition.tiers.iter().enumerate() {
            if definition.tiers[..index].iter().any(|r| r.tier == row.tier) {
                return Err(RegistryError::DuplicateTier {
                    pathway: definition.id.clone(),
                    tier: row.tier,
                });
            }
            if let Some(skill) = row.skills.iter().find(|s| !skills.contains(s)) {
                return Err(RegistryError::UnknownSkill {
                    pathway: definition.id.clone(),
                    skill: skill.clone(),
                });
            }
        }
        self.pathways.insert(definition.id.clone(), definition);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pathways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pathways.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &PathwayId> {
        self.pathways.keys()
    }
}

impl ProgressionOracle for PathwayRegistry {
    fn pathway(&self, id: &PathwayId) -> Option<&PathwayDefinition> {
        self.pathways.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::SkillRegistry;
    use crate::skill::{CastType, SkillDefinition};

    fn skill(raw: &str) -> SkillId {
        SkillId::new(raw).unwrap()
    }

    fn tier(value: u8) -> Tier {
        Tier::new(value).unwrap()
    }

    fn pathway() -> PathwayDefinition {
        PathwayDefinition::new(PathwayId::new("lotm:seer").unwrap(), "Seer")
            .with_tier(
                TierRow::new(tier(9))
                    .with_spirituality_bonus(50.0)
                    .with_skills([skill("seer:spirit_vision")]),
            )
            .with_tier(TierRow::new(tier(8)).with_skills([skill("seer:danger_sense")]))
            .with_tier(TierRow::new(tier(7)).with_skills([skill("seer:divination")]))
    }

    fn skills() -> SkillRegistry {
        SkillRegistry::from_definitions(
            ["seer:spirit_vision", "seer:danger_sense", "seer:divination"]
                .into_iter()
                .map(|raw| SkillDefinition::new(skill(raw), CastType::Instant)),
        )
        .unwrap()
    }

    #[test]
    fn unlocks_include_weaker_tiers_only() {
        let pathway = pathway();
        assert_eq!(
            pathway.skills_unlocked_at(tier(8)),
            vec![skill("seer:spirit_vision"), skill("seer:danger_sense")]
        );
        assert_eq!(pathway.skills_unlocked_at(tier(9)).len(), 1);
        assert_eq!(pathway.skills_unlocked_at(tier(0)).len(), 3);
    }

    #[test]
    fn unknown_rows_contribute_nothing() {
        let registry = PathwayRegistry::from_definitions([pathway()], &skills()).unwrap();
        let id = PathwayId::new("lotm:seer").unwrap();
        assert_eq!(registry.spirituality_bonus(&id, tier(9)), 50.0);
        assert_eq!(registry.spirituality_bonus(&id, tier(3)), 0.0);
        assert_eq!(
            registry.gaze_base_ticks(&id, tier(3)),
            TierRow::DEFAULT_GAZE_BASE_TICKS
        );
    }

    #[test]
    fn rejects_unregistered_unlocks_and_duplicates() {
        let empty = SkillRegistry::new();
        assert!(matches!(
            PathwayRegistry::from_definitions([pathway()], &empty),
            Err(RegistryError::UnknownSkill { .. })
        ));
        assert!(matches!(
            PathwayRegistry::from_definitions([pathway(), pathway()], &skills()),
            Err(RegistryError::DuplicatePathway(_))
        ));
    }
}
