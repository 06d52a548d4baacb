//! Oracle access errors.
//!
//! Errors related to collaborator availability and data access.

use crate::error::{ErrorSeverity, GameError};
use crate::state::UnitId;

/// Errors that occur when reaching out to an external collaborator.
///
/// A missing collaborator is fatal to the operation that needed it (the
/// operation is skipped); a failed lookup is a validation error and the
/// caller falls back to a default.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    /// FloorOracle is not available in the environment.
    #[error("FloorOracle not available")]
    FloorsNotAvailable,

    /// PresentationSink is not available in the environment.
    #[error("PresentationSink not available")]
    PresentationNotAvailable,

    /// EnemyFactory is not available in the environment.
    #[error("EnemyFactory not available")]
    EnemiesNotAvailable,

    /// RngOracle is not available in the environment.
    #[error("RngOracle not available")]
    RngNotAvailable,

    /// The unit is not placed on any floor or room.
    #[error("unit {0} is not placed in the dungeon")]
    UnitNotPlaced(UnitId),

    /// Enemy template was not found by name.
    #[error("enemy template '{0}' not found")]
    EnemyTemplateNotFound(String),
}

impl GameError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            // Missing collaborators skip the whole operation
            FloorsNotAvailable | PresentationNotAvailable | EnemiesNotAvailable
            | RngNotAvailable => ErrorSeverity::Fatal,

            // Not found errors fall back to defaults
            UnitNotPlaced(_) | EnemyTemplateNotFound(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            FloorsNotAvailable => "ORACLE_FLOORS_NOT_AVAILABLE",
            PresentationNotAvailable => "ORACLE_PRESENTATION_NOT_AVAILABLE",
            EnemiesNotAvailable => "ORACLE_ENEMIES_NOT_AVAILABLE",
            RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
            UnitNotPlaced(_) => "ORACLE_UNIT_NOT_PLACED",
            EnemyTemplateNotFound(_) => "ORACLE_ENEMY_TEMPLATE_NOT_FOUND",
        }
    }
}
