//! Decides when an actor's blobs must be pushed to observers.

use std::collections::BTreeMap;

use bitflags::bitflags;

use crate::config::GameConfig;
use crate::perception::GazeBook;
use crate::state::{ActorState, SkillId};
use crate::sync::{AbilityBlob, PerceptionBlob, ResourceBlob};

bitflags! {
    /// Why a push happened. Several reasons can coincide.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SyncReason: u8 {
        /// First push after attach.
        const INITIAL      = 1 << 0;
        const RESOURCE     = 1 << 1;
        const ACTIVE_SET   = 1 << 2;
        /// Learned set, presets, page, or a cooldown the observer cannot predict.
        const ABILITY      = 1 << 3;
        const HEARTBEAT    = 1 << 4;
        /// Requested explicitly (initialize, respawn, restore).
        const FORCED       = 1 << 5;
        /// Watcher set, divination query or mastery.
        const PERCEPTION   = 1 << 6;
    }
}

/// One push worth of state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncPush {
    pub reasons: SyncReason,
    pub resource: ResourceBlob,
    pub ability: AbilityBlob,
    pub perception: PerceptionBlob,
}

/// Per-actor record of the last pushed state.
#[derive(Clone, Debug, Default)]
pub struct SyncTracker {
    last_resource: Option<ResourceBlob>,
    last_ability: Option<AbilityBlob>,
    last_perception: Option<PerceptionBlob>,
    since_push: u32,
    forced: bool,
}

impl SyncTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guarantees a push on the next poll.
    pub fn force(&mut self) {
        self.forced = true;
    }

    /// Counts one simulation tick.
    pub fn advance(&mut self) {
        self.since_push = self.since_push.saturating_add(1);
    }

    pub fn ticks_since_push(&self) -> u32 {
        self.since_push
    }

    /// Cooldowns the observer's mirror shows right now.
    fn predicted_cooldowns(&self) -> BTreeMap<SkillId, u32> {
        self.last_ability
            .iter()
            .flat_map(|blob| blob.cooldowns.iter())
            .filter_map(|(id, ticks)| {
                let left = ticks.saturating_sub(self.since_push);
                (left > 0).then(|| (id.clone(), left))
            })
            .collect()
    }

    fn reasons(
        &self,
        resource: &ResourceBlob,
        ability: &AbilityBlob,
        perception: &PerceptionBlob,
        config: &GameConfig,
    ) -> SyncReason {
        let (Some(last_resource), Some(last_ability), Some(last_perception)) = (
            &self.last_resource,
            &self.last_ability,
            &self.last_perception,
        ) else {
            return SyncReason::INITIAL;
        };

        let mut reasons = SyncReason::empty();
        if self.forced {
            reasons |= SyncReason::FORCED;
        }
        if resource.differs(last_resource, config.sync_epsilon) {
            reasons |= SyncReason::RESOURCE;
        }
        if !ability.active.keys().eq(last_ability.active.keys()) {
            reasons |= SyncReason::ACTIVE_SET;
        }
        if ability.learned != last_ability.learned
            || ability.presets != last_ability.presets
            || ability.active_page != last_ability.active_page
            || ability.cooldowns != self.predicted_cooldowns()
        {
            reasons |= SyncReason::ABILITY;
        }
        if perception.differs(last_perception) {
            reasons |= SyncReason::PERCEPTION;
        }
        if self.since_push >= config.heartbeat_interval {
            reasons |= SyncReason::HEARTBEAT;
        }
        reasons
    }

    /// Returns the blobs to push, if anything warrants a push, and records
    /// them as the observer's new view.
    pub fn poll(
        &mut self,
        actor: &ActorState,
        gaze: &GazeBook,
        config: &GameConfig,
    ) -> Option<SyncPush> {
        let resource = ResourceBlob::capture(actor);
        let ability = AbilityBlob::capture(actor);
        let perception = PerceptionBlob::capture(actor, gaze);
        let reasons = self.reasons(&resource, &ability, &perception, config);
        if reasons.is_empty() {
            return None;
        }
        self.last_resource = Some(resource.clone());
        self.last_ability = Some(ability.clone());
        self.last_perception = Some(perception.clone());
        self.since_push = 0;
        self.forced = false;
        Some(SyncPush {
            reasons,
            resource,
            ability,
            perception,
        })
    }
}
