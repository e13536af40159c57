use crate::state::SkillId;

/// Player-facing notifications produced by casts and ticks.
///
/// The core only produces these; rendering them is the host's concern.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Notice {
    Activated(SkillId),
    Deactivated(SkillId),
    /// Upkeep could not be paid.
    AutoDeactivated(SkillId),
    OnCooldown { skill: SkillId, remaining: u32 },
    ResourceLow {
        skill: SkillId,
        required: f64,
        available: f64,
    },
    Learned(SkillId),
    Forgotten(SkillId),
}

impl Notice {
    pub fn skill(&self) -> &SkillId {
        match self {
            Notice::Activated(id)
            | Notice::Deactivated(id)
            | Notice::AutoDeactivated(id)
            | Notice::Learned(id)
            | Notice::Forgotten(id) => id,
            Notice::OnCooldown { skill, .. } | Notice::ResourceLow { skill, .. } => skill,
        }
    }
}
