//! Danger sense: turning sustained gaze into alerts.
//!
//! For every target with an active danger-sense skill and every other actor
//! watching it, one pass runs three checks (occlusion, view cone,
//! contest-derived delay) before advancing the pair's [`GazeTracker`].
//!
//! [`GazeTracker`]: super::GazeTracker

use std::collections::BTreeMap;

use crate::config::GameConfig;
use crate::env::{GameEnv, OracleError, Pose, ProgressionOracle, SkillOracle, TierRow, WorldOracle};
use crate::perception::{GazeBook, PairKey, PerceptionEvaluator};
use crate::skill::SkillTags;
use crate::state::{ActorId, ActorState};

/// A target noticed it is being watched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GazeAlert {
    pub observer: ActorId,
    pub target: ActorId,
    pub tick: u64,
    pub required_ticks: u32,
}

/// Target is visible if the direct line of sight holds or any sampled body
/// point has a clear ray to the observer's eye.
pub fn is_visible<W: WorldOracle + ?Sized>(
    world: &W,
    observer: ActorId,
    observer_pose: &Pose,
    target: ActorId,
    target_pose: &Pose,
) -> bool {
    if world.line_of_sight(observer, target) {
        return true;
    }
    let eye = observer_pose.eye();
    target_pose
        .sample_points()
        .iter()
        .any(|point| world.ray_clear(eye, *point))
}

/// Target center lies within the observer's gaze cone and range.
pub fn in_cone(observer: &Pose, target: &Pose, config: &GameConfig) -> bool {
    let to_target = target.center() - observer.eye();
    if to_target.length() > config.gaze_max_distance {
        return false;
    }
    observer.look.angle_degrees(to_target) <= config.gaze_fov_degrees
}

/// `base + max(0, 2 × (observer concealment − target detection))`, rounded up.
pub fn required_ticks(base: u32, observer_concealment: f64, target_detection: f64) -> u32 {
    let extra = (2.0 * (observer_concealment - target_detection)).max(0.0).ceil();
    base.saturating_add(extra as u32)
}

pub struct DangerSense<'a> {
    skills: &'a dyn SkillOracle,
    progression: &'a dyn ProgressionOracle,
    world: &'a dyn WorldOracle,
    perception: PerceptionEvaluator<'a>,
    config: &'a GameConfig,
}

impl<'a> DangerSense<'a> {
    pub fn from_env(env: &GameEnv<'a>, config: &'a GameConfig) -> Result<Self, OracleError> {
        Ok(Self {
            skills: env.skills()?,
            progression: env.progression()?,
            world: env.world()?,
            perception: PerceptionEvaluator::from_env(env, config)?,
            config,
        })
    }

    /// Whether `actor` has an active danger-sense skill.
    pub fn senses_danger(&self, actor: &ActorState) -> bool {
        actor.ability.active_skills().any(|id| {
            self.skills
                .definition(id)
                .is_some_and(|def| def.tags.contains(SkillTags::DANGER_SENSE))
        })
    }

    pub fn required_ticks_for(&self, observer: &ActorState, target: &ActorState) -> u32 {
        let base = target
            .resource
            .pathway()
            .map_or(TierRow::DEFAULT_GAZE_BASE_TICKS, |p| {
                self.progression.gaze_base_ticks(p, target.tier())
            });
        required_ticks(
            base,
            self.perception.concealment(observer),
            self.perception.effective_detection(target),
        )
    }

    /// Runs one pass covering `elapsed` ticks and returns the alerts raised.
    pub fn pass(
        &self,
        actors: &BTreeMap<ActorId, ActorState>,
        book: &mut GazeBook,
        now: u64,
        elapsed: u32,
    ) -> Vec<GazeAlert> {
        let mut alerts = Vec::new();
        for target in actors.values() {
            let target_pose = self.world.pose(target.id);
            let Some(target_pose) = target_pose.filter(|_| self.senses_danger(target)) else {
                book.reset_watchers_of(target.id);
                continue;
            };
            for observer in actors.values().filter(|a| a.id != target.id) {
                let pair = PairKey::new(observer.id, target.id);
                let Some(observer_pose) = self.world.pose(observer.id) else {
                    book.reset(pair);
                    continue;
                };
                let required = self.required_ticks_for(observer, target);
                if required > self.config.gaze_concealment_ceiling {
                    book.reset(pair);
                    continue;
                }

                let looking = in_cone(&observer_pose, &target_pose, self.config)
                    && is_visible(
                        self.world,
                        observer.id,
                        &observer_pose,
                        target.id,
                        &target_pose,
                    );
                let tracker = book.tracker_mut(pair);
                tracker.advance(looking, elapsed);
                if !tracker.is_triggered(required) {
                    continue;
                }
                tracker.reset();
                if book.can_alert(pair, now, self.config.alert_cooldown_ticks) {
                    book.record_alert(pair, now);
                    alerts.push(GazeAlert {
                        observer: observer.id,
                        target: target.id,
                        tick: now,
                        required_ticks: required,
                    });
                }
            }
        }
        alerts
    }
}
