use crate::config::GameConfig;
use crate::divination::DivinationCarrier;
use crate::env::SkillOracle;
use crate::state::{AbilityState, ActorId, ResourceState, Tier};

bitflags::bitflags! {
    /// Mode flags of an actor.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ActorFlags: u8 {
        /// Has taken a pathway potion; required to cast.
        const BEYONDER = 1 << 0;
        /// Creative/debug mode: no costs, no cooldowns, no upkeep.
        const UNRESTRICTED = 1 << 1;
    }
}

/// Everything the simulation tracks for one actor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorState {
    pub id: ActorId,
    pub flags: ActorFlags,
    pub resource: ResourceState,
    pub ability: AbilityState,
    mastery: u32,
    pub carrier: DivinationCarrier,
}

impl ActorState {
    pub fn new(id: ActorId) -> Self {
        Self {
            id,
            flags: ActorFlags::empty(),
            resource: ResourceState::new(),
            ability: AbilityState::new(),
            mastery: 0,
            carrier: DivinationCarrier::default(),
        }
    }

    pub fn with_flags(mut self, flags: ActorFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_beyonder(&self) -> bool {
        self.flags.contains(ActorFlags::BEYONDER)
    }

    pub fn is_unrestricted(&self) -> bool {
        self.flags.contains(ActorFlags::UNRESTRICTED)
    }

    pub fn tier(&self) -> Tier {
        self.resource.tier()
    }

    /// Tier used in contests; `None` for non-Beyonders.
    pub fn beyonder_tier(&self) -> Option<Tier> {
        self.is_beyonder().then(|| self.resource.tier())
    }

    pub fn mastery(&self) -> u32 {
        self.mastery
    }

    /// Adds divination mastery, saturating at [`GameConfig::MAX_MASTERY`].
    pub fn add_mastery(&mut self, amount: u32) -> u32 {
        let before = self.mastery;
        self.mastery = self
            .mastery
            .saturating_add(amount)
            .min(GameConfig::MAX_MASTERY);
        self.mastery - before
    }

    pub fn set_mastery(&mut self, mastery: u32) {
        self.mastery = mastery.min(GameConfig::MAX_MASTERY);
    }

    /// Full snapshot-and-replace from `source`, keeping this actor's id.
    pub fn copy_from<S: SkillOracle + ?Sized>(&mut self, source: &ActorState, skills: &S) {
        self.flags = source.flags;
        self.resource.copy_from(&source.resource);
        self.ability.copy_from(&source.ability, skills);
        self.mastery = source.mastery;
        self.carrier = source.carrier.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mastery_is_bounded() {
        let mut actor = ActorState::new(ActorId(1));
        actor.set_mastery(GameConfig::MAX_MASTERY - 1);
        assert_eq!(actor.add_mastery(3), 1);
        assert_eq!(actor.mastery(), GameConfig::MAX_MASTERY);
        actor.set_mastery(u32::MAX);
        assert_eq!(actor.mastery(), GameConfig::MAX_MASTERY);
    }

    #[test]
    fn non_beyonders_have_no_contest_tier() {
        let actor = ActorState::new(ActorId(1));
        assert_eq!(actor.beyonder_tier(), None);
        let beyonder = actor.with_flags(ActorFlags::BEYONDER);
        assert_eq!(beyonder.beyonder_tier(), Some(Tier::WEAKEST));
    }
}
