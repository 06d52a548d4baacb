//! Ports to the collaborators the core does not own.
//!
//! Oracles expose the dungeon layout, presentation, enemy construction and
//! randomness. The [`Env`] aggregate bundles them so events and battles can
//! reach what they need without hard coupling to concrete implementations.
mod enemies;
mod error;
mod floor;
mod presentation;
mod rng;

pub use enemies::{EnemyFactory, EnemyTemplate};
pub use error::OracleError;
pub use floor::FloorOracle;
pub use presentation::PresentationSink;
pub use rng::{
    PcgRng, RngOracle, compute_seed, pick_weighted, pick_weighted_index, roll_weighted,
    total_weight,
};

/// Aggregates the collaborator ports used by events and battles.
pub struct Env<'a, F, P, E, R>
where
    F: FloorOracle + ?Sized,
    P: PresentationSink + ?Sized,
    E: EnemyFactory + ?Sized,
    R: RngOracle + ?Sized,
{
    floors: Option<&'a F>,
    presentation: Option<&'a P>,
    enemies: Option<&'a E>,
    rng: Option<&'a R>,
}

pub type GameEnv<'a> = Env<
    'a,
    dyn FloorOracle + 'a,
    dyn PresentationSink + 'a,
    dyn EnemyFactory + 'a,
    dyn RngOracle + 'a,
>;

impl<'a, F, P, E, R> Env<'a, F, P, E, R>
where
    F: FloorOracle + ?Sized,
    P: PresentationSink + ?Sized,
    E: EnemyFactory + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(
        floors: Option<&'a F>,
        presentation: Option<&'a P>,
        enemies: Option<&'a E>,
        rng: Option<&'a R>,
    ) -> Self {
        Self {
            floors,
            presentation,
            enemies,
            rng,
        }
    }

    pub fn with_all(floors: &'a F, presentation: &'a P, enemies: &'a E, rng: &'a R) -> Self {
        Self::new(Some(floors), Some(presentation), Some(enemies), Some(rng))
    }

    pub fn empty() -> Self {
        Self {
            floors: None,
            presentation: None,
            enemies: None,
            rng: None,
        }
    }

    /// Returns the FloorOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::FloorsNotAvailable` if no floor oracle was provided.
    pub fn floors(&self) -> Result<&'a F, OracleError> {
        self.floors.ok_or(OracleError::FloorsNotAvailable)
    }

    /// Returns the PresentationSink, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::PresentationNotAvailable` if no sink was provided.
    pub fn presentation(&self) -> Result<&'a P, OracleError> {
        self.presentation
            .ok_or(OracleError::PresentationNotAvailable)
    }

    /// Returns the EnemyFactory, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::EnemiesNotAvailable` if no factory was provided.
    pub fn enemies(&self) -> Result<&'a E, OracleError> {
        self.enemies.ok_or(OracleError::EnemiesNotAvailable)
    }

    /// Returns the RngOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no rng oracle was provided.
    pub fn rng(&self) -> Result<&'a R, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }
}

// Derives would put `Clone`/`Debug` bounds on the oracles themselves.
impl<F, P, E, R> Clone for Env<'_, F, P, E, R>
where
    F: FloorOracle + ?Sized,
    P: PresentationSink + ?Sized,
    E: EnemyFactory + ?Sized,
    R: RngOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<F, P, E, R> Copy for Env<'_, F, P, E, R>
where
    F: FloorOracle + ?Sized,
    P: PresentationSink + ?Sized,
    E: EnemyFactory + ?Sized,
    R: RngOracle + ?Sized,
{
}

impl<F, P, E, R> core::fmt::Debug for Env<'_, F, P, E, R>
where
    F: FloorOracle + ?Sized,
    P: PresentationSink + ?Sized,
    E: EnemyFactory + ?Sized,
    R: RngOracle + ?Sized,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Env")
            .field("floors", &self.floors.is_some())
            .field("presentation", &self.presentation.is_some())
            .field("enemies", &self.enemies.is_some())
            .field("rng", &self.rng.is_some())
            .finish()
    }
}

impl<'a, F, P, E, R> Env<'a, F, P, E, R>
where
    F: FloorOracle + 'a,
    P: PresentationSink + 'a,
    E: EnemyFactory + 'a,
    R: RngOracle + 'a,
{
    /// Converts this environment into a trait-object based `GameEnv` (consumes self).
    pub fn into_game_env(self) -> GameEnv<'a> {
        self.as_game_env()
    }

    /// Converts this environment into a trait-object based `GameEnv` (borrows self).
    pub fn as_game_env(&self) -> GameEnv<'a> {
        let floors: Option<&'a dyn FloorOracle> = self.floors.map(|floors| floors as _);
        let presentation: Option<&'a dyn PresentationSink> =
            self.presentation.map(|presentation| presentation as _);
        let enemies: Option<&'a dyn EnemyFactory> = self.enemies.map(|enemies| enemies as _);
        let rng: Option<&'a dyn RngOracle> = self.rng.map(|rng| rng as _);
        Env::new(floors, presentation, enemies, rng)
    }
}
