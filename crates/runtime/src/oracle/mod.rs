//! Runtime implementations of the `game-core` collaborator traits.
//!
//! These implementations are bundled into an [`OracleManager`] so the session
//! can build [`game_core::Env`] snapshots on demand. Floors and enemy
//! templates are static; unit positions and the message log change as the
//! session runs.
mod enemies;
mod floors;
mod presentation;

use game_core::{Env, GameEnv, PcgRng};
use std::sync::Arc;

pub use enemies::EnemyCatalog;
pub use floors::{FloorInfo, FloorLayout};
pub use presentation::MessageLog;

/// Manages all oracle implementations and provides unified access
#[derive(Clone, Debug)]
pub struct OracleManager {
    pub(crate) floors: Arc<FloorLayout>,
    pub(crate) presentation: Arc<MessageLog>,
    pub(crate) enemies: Arc<EnemyCatalog>,
    pub(crate) rng: PcgRng,
}

impl OracleManager {
    /// Creates a new oracle manager
    pub fn new(
        floors: Arc<FloorLayout>,
        presentation: Arc<MessageLog>,
        enemies: Arc<EnemyCatalog>,
    ) -> Self {
        Self {
            floors,
            presentation,
            enemies,
            rng: PcgRng,
        }
    }

    /// Converts oracle manager into GameEnv for game-core
    pub fn as_game_env(&self) -> GameEnv<'_> {
        Env::with_all(
            self.floors.as_ref(),
            self.presentation.as_ref(),
            self.enemies.as_ref(),
            &self.rng,
        )
        .into_game_env()
    }

    pub fn floors(&self) -> &FloorLayout {
        &self.floors
    }

    pub fn presentation(&self) -> &MessageLog {
        &self.presentation
    }

    pub fn enemies(&self) -> &EnemyCatalog {
        &self.enemies
    }
}
