//! Battle errors.

use crate::error::{ErrorSeverity, GameError};
use crate::state::UnitId;

/// Errors raised by the battle loop and stance handling.
///
/// None of them abort anything beyond the request itself: the battle (or
/// the absence of one) is left exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    /// A battle is already running on this system.
    #[error("a battle is already in progress")]
    BattleInProgress,

    /// No battle is running.
    #[error("no battle is in progress")]
    NoActiveBattle,

    /// A participant entered the battle already defeated.
    #[error("unit {0} is already defeated")]
    UnitDefeated(UnitId),

    /// The unit is not the player of the running battle.
    #[error("unit {0} is not in the running battle")]
    NotInBattle(UnitId),

    /// The same unit was put on both sides.
    #[error("unit {0} cannot fight itself")]
    SameUnit(UnitId),

    /// The stagger ailment is not in the registry.
    #[error("stagger effect '{0}' is not registered")]
    MissingStaggerEffect(String),

    /// The registry had the ailment but the unit rejected it.
    #[error("unit {0} could not be staggered")]
    StaggerRejected(UnitId),
}

impl GameError for BattleError {
    fn severity(&self) -> ErrorSeverity {
        use BattleError::*;
        match self {
            BattleInProgress | UnitDefeated(_) | SameUnit(_) | StaggerRejected(_) => {
                ErrorSeverity::Recoverable
            }
            NoActiveBattle | NotInBattle(_) => ErrorSeverity::Validation,
            MissingStaggerEffect(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use BattleError::*;
        match self {
            BattleInProgress => "BATTLE_IN_PROGRESS",
            NoActiveBattle => "BATTLE_NOT_ACTIVE",
            NotInBattle(_) => "BATTLE_NOT_A_PARTICIPANT",
            UnitDefeated(_) => "BATTLE_UNIT_DEFEATED",
            SameUnit(_) => "BATTLE_SAME_UNIT",
            MissingStaggerEffect(_) => "BATTLE_MISSING_STAGGER_EFFECT",
            StaggerRejected(_) => "BATTLE_STAGGER_REJECTED",
        }
    }
}
