//! Traits describing read-only data supplied by the host.
//!
//! Oracles expose skill definitions, pathway progression, actor attributes,
//! world geometry and randomness. The [`Env`] aggregate bundles them so the
//! engine can reach everything it needs without coupling to concrete
//! implementations. Registries are ordinary values built at startup and
//! passed in here, never process-wide globals.
mod attributes;
mod error;
mod progression;
mod rng;
mod skills;
mod world;

pub use attributes::{AttributeOracle, Attributes, Disposition};
pub use error::{OracleError, RegistryError};
pub use progression::{PathwayDefinition, PathwayRegistry, ProgressionOracle, TierRow};
pub use rng::{FixedRng, PcgRng, RngOracle, compute_seed, context as rng_context};
pub use skills::{SkillOracle, SkillRegistry};
pub use world::{Pose, WorldEntity, WorldOracle};

/// Aggregates the read-only oracles required by the engine.
pub struct Env<'a, S, P, A, W, R>
where
    S: SkillOracle + ?Sized,
    P: ProgressionOracle + ?Sized,
    A: AttributeOracle + ?Sized,
    W: WorldOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    skills: Option<&'a S>,
    progression: Option<&'a P>,
    attributes: Option<&'a A>,
    world: Option<&'a W>,
    rng: Option<&'a R>,
}

impl<S, P, A, W, R> Clone for Env<'_, S, P, A, W, R>
where
    S: SkillOracle + ?Sized,
    P: ProgressionOracle + ?Sized,
    A: AttributeOracle + ?Sized,
    W: WorldOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, P, A, W, R> Copy for Env<'_, S, P, A, W, R>
where
    S: SkillOracle + ?Sized,
    P: ProgressionOracle + ?Sized,
    A: AttributeOracle + ?Sized,
    W: WorldOracle + ?Sized,
    R: RngOracle + ?Sized,
{
}

pub type GameEnv<'a> = Env<
    'a,
    dyn SkillOracle + 'a,
    dyn ProgressionOracle + 'a,
    dyn AttributeOracle + 'a,
    dyn WorldOracle + 'a,
    dyn RngOracle + 'a,
>;

impl<'a, S, P, A, W, R> Env<'a, S, P, A, W, R>
where
    S: SkillOracle + ?Sized,
    P: ProgressionOracle + ?Sized,
    A: AttributeOracle + ?Sized,
    W: WorldOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(
        skills: Option<&'a S>,
        progression: Option<&'a P>,
        attributes: Option<&'a A>,
        world: Option<&'a W>,
        rng: Option<&'a R>,
    ) -> Self {
        Self {
            skills,
            progression,
            attributes,
            world,
            rng,
        }
    }

    pub fn with_all(
        skills: &'a S,
        progression: &'a P,
        attributes: &'a A,
        world: &'a W,
        rng: &'a R,
    ) -> Self {
        Self::new(
            Some(skills),
            Some(progression),
            Some(attributes),
            Some(world),
            Some(rng),
        )
    }

    pub fn empty() -> Self {
        Self {
            skills: None,
            progression: None,
            attributes: None,
            world: None,
            rng: None,
        }
    }

    /// Returns the SkillOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::SkillsNotAvailable` if no skill oracle was provided.
    pub fn skills(&self) -> Result<&'a S, OracleError> {
        self.skills.ok_or(OracleError::SkillsNotAvailable)
    }

    /// Returns the ProgressionOracle, or an error if not available.
    pub fn progression(&self) -> Result<&'a P, OracleError> {
        self.progression.ok_or(OracleError::ProgressionNotAvailable)
    }

    /// Returns the AttributeOracle, or an error if not available.
    pub fn attributes(&self) -> Result<&'a A, OracleError> {
        self.attributes.ok_or(OracleError::AttributesNotAvailable)
    }

    /// Returns the WorldOracle, or an error if not available.
    pub fn world(&self) -> Result<&'a W, OracleError> {
        self.world.ok_or(OracleError::WorldNotAvailable)
    }

    /// Returns the RngOracle, or an error if not available.
    pub fn rng(&self) -> Result<&'a R, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }
}

impl<'a, S, P, A, W, R> Env<'a, S, P, A, W, R>
where
    S: SkillOracle + 'a,
    P: ProgressionOracle + 'a,
    A: AttributeOracle + 'a,
    W: WorldOracle + 'a,
    R: RngOracle + 'a,
{
    /// Converts this environment into a trait-object based `GameEnv` (consumes self).
    pub fn into_game_env(self) -> GameEnv<'a> {
        self.as_game_env()
    }

    /// Converts this environment into a trait-object based `GameEnv` (borrows self).
    pub fn as_game_env(&self) -> GameEnv<'a> {
        let skills: Option<&'a dyn SkillOracle> = self.skills.map(|s| s as _);
        let progression: Option<&'a dyn ProgressionOracle> = self.progression.map(|p| p as _);
        let attributes: Option<&'a dyn AttributeOracle> = self.attributes.map(|a| a as _);
        let world: Option<&'a dyn WorldOracle> = self.world.map(|w| w as _);
        let rng: Option<&'a dyn RngOracle> = self.rng.map(|r| r as _);
        Env::new(skills, progression, attributes, world, rng)
    }
}
