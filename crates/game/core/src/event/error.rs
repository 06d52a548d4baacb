//! Event engine errors.

use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::UnitId;

/// Errors returned by the event manager.
///
/// Every variant describes a request that was skipped; the manager's state
/// is unchanged when one of these comes back.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// No event name was given.
    #[error("no event given")]
    MissingEvent,

    /// No template is registered at all, so not even a fallback exists.
    #[error("no event templates are registered")]
    NoTemplates,

    /// The template source failed to produce templates.
    #[error("template source failed: {0}")]
    TemplateSource(String),

    /// The unit already has an active event.
    #[error("unit {0} is already in an event")]
    AlreadyInEvent(UnitId),

    /// The unit has no active event.
    #[error("unit {0} is not in an event")]
    NotInEvent(UnitId),

    /// The unit's event is not waiting for the given signal.
    #[error("event of unit {unit} is not waiting for {signal}")]
    NotAwaiting { unit: UnitId, signal: &'static str },

    /// The chosen option does not exist.
    #[error("choice {index} is out of range for unit {unit} ({options} options)")]
    InvalidChoice {
        unit: UnitId,
        index: usize,
        options: usize,
    },

    /// A collaborator could not be reached.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl GameError for EventError {
    fn severity(&self) -> ErrorSeverity {
        use EventError::*;
        match self {
            MissingEvent | InvalidChoice { .. } => ErrorSeverity::Validation,
            NoTemplates | TemplateSource(_) => ErrorSeverity::Internal,
            AlreadyInEvent(_) | NotInEvent(_) | NotAwaiting { .. } => ErrorSeverity::Recoverable,
            Oracle(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        use EventError::*;
        match self {
            MissingEvent => "EVENT_MISSING",
            NoTemplates => "EVENT_NO_TEMPLATES",
            TemplateSource(_) => "EVENT_TEMPLATE_SOURCE",
            AlreadyInEvent(_) => "EVENT_ALREADY_ACTIVE",
            NotInEvent(_) => "EVENT_NOT_ACTIVE",
            NotAwaiting { .. } => "EVENT_NOT_AWAITING",
            InvalidChoice { .. } => "EVENT_INVALID_CHOICE",
            Oracle(err) => err.error_code(),
        }
    }
}
