//! Unified error type surfaced by the session API.
//!
//! Wraps failures from the event manager, the battle system and content
//! loading so clients can bubble them up with consistent context.
use thiserror::Error;

use game_core::{BattleError, ErrorSeverity, EventError, GameError, UnitId};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("unit {0} is not part of the session")]
    UnknownUnit(UnitId),

    #[error("unit {0} is already part of the session")]
    DuplicateUnit(UnitId),

    #[error("content failed to load: {0}")]
    Content(String),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Battle(#[from] BattleError),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::UnknownUnit(_) | RuntimeError::DuplicateUnit(_) => {
                ErrorSeverity::Validation
            }
            RuntimeError::Content(_) => ErrorSeverity::Fatal,
            RuntimeError::Event(err) => err.severity(),
            RuntimeError::Battle(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::UnknownUnit(_) => "RUNTIME_UNKNOWN_UNIT",
            RuntimeError::DuplicateUnit(_) => "RUNTIME_DUPLICATE_UNIT",
            RuntimeError::Content(_) => "RUNTIME_CONTENT",
            RuntimeError::Event(err) => err.error_code(),
            RuntimeError::Battle(err) => err.error_code(),
        }
    }
}
