use behavior_tree::{Behavior, Status};

use crate::event::step::{Directive, StepContext};

/// Turns the unit's room into another event.
///
/// With `restart` the new event runs at once; otherwise it takes over from
/// the next visit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TransformInto {
    /// Target event; the configured default if unset.
    pub into: Option<String>,
    pub restart: bool,
}

impl TransformInto {
    pub fn new(into: impl Into<String>) -> Self {
        Self {
            into: Some(into.into()),
            restart: false,
        }
    }
}

impl Behavior<StepContext<'_>> for TransformInto {
    fn tick(&self, ctx: &mut StepContext<'_>) -> Status {
        let into = ctx.fallback_event(self.into.as_deref());
        ctx.direct(Directive::Transform {
            into,
            restart: self.restart,
        });
        Status::Success
    }
}

/// Ends the event early with the given result.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompleteEvent {
    pub success: bool,
}

impl Default for CompleteEvent {
    fn default() -> Self {
        Self { success: true }
    }
}

impl Behavior<StepContext<'_>> for CompleteEvent {
    fn tick(&self, ctx: &mut StepContext<'_>) -> Status {
        ctx.direct(Directive::Complete {
            success: self.success,
        });
        Status::Success
    }
}
