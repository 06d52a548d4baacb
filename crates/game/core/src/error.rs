//! Common error infrastructure for game-core.
//!
//! Domain errors (`EventError`, `BattleError`, `OracleError`) live next to the
//! code that raises them. None of them are fatal to the process: every public
//! operation that fails logs and leaves state untouched, and the `Err` value
//! tells the caller which kind of no-op happened.
//!
//! # Severity mapping
//!
//! - **Fatal**: a collaborator is missing, the operation is skipped
//! - **Validation**: a lookup missed, a fallback value was used
//! - **Recoverable**: an invariant would be violated, the request is ignored
//! - **Internal**: content is misconfigured, a fallback transformation applies

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Request ignored because it would break an invariant.
    ///
    /// Examples: second battle while one runs, staggering a dead unit
    Recoverable,

    /// A lookup failed and a fallback was used or the step was skipped.
    ///
    /// Examples: unknown event name, unknown unit
    Validation,

    /// Content or configuration is inconsistent.
    ///
    /// Examples: empty loot table, empty enemy pool, no templates at all
    Internal,

    /// A required collaborator is absent.
    ///
    /// Examples: no presentation sink, no floor provider
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates broken content or wiring.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all game-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity by how the caller should react, not by impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
