use std::str::FromStr;

use behavior_tree::{Behavior, Status};
use tracing::{debug, warn};

use crate::event::context::keys;
use crate::event::step::{Await, StepContext};
use crate::state::{EventSubState, MainState};

/// Moves the unit into another main/sub state, or back to the one recorded
/// by an earlier change.
///
/// Never blocks and never fails; sequencing does not depend on it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StateChange {
    pub main: Option<MainState>,
    pub sub: Option<EventSubState>,
    /// Restore the states saved by the previous change instead.
    pub revert: bool,
}

impl StateChange {
    pub fn enter(main: MainState, sub: EventSubState) -> Self {
        Self {
            main: Some(main),
            sub: Some(sub),
            revert: false,
        }
    }

    pub fn revert() -> Self {
        Self {
            revert: true,
            ..Self::default()
        }
    }

    fn restore(ctx: &mut StepContext<'_>) {
        let main = ctx.lookup_as(keys::PREVIOUS_MAIN_STATE, String::new());
        let sub = ctx.lookup_as(keys::PREVIOUS_EVENT_STATE, String::new());

        match MainState::from_str(&main) {
            Ok(state) => ctx.unit.main_state = state,
            Err(_) => warn!(unit = %ctx.unit.id, saved = %main, "no main state to restore"),
        }
        if let Ok(state) = EventSubState::from_str(&sub) {
            ctx.unit.event_state = state;
        }
    }
}

impl Behavior<StepContext<'_>> for StateChange {
    fn tick(&self, ctx: &mut StepContext<'_>) -> Status {
        if self.revert {
            Self::restore(ctx);
        } else {
            let main = ctx.unit.main_state.to_string();
            let sub = ctx.unit.event_state.to_string();
            ctx.publish(keys::PREVIOUS_MAIN_STATE, main);
            ctx.publish(keys::PREVIOUS_EVENT_STATE, sub);

            if let Some(state) = self.main {
                ctx.unit.main_state = state;
            }
            if let Some(state) = self.sub {
                ctx.unit.event_state = state;
            }
        }

        debug!(
            unit = %ctx.unit.id,
            main = %ctx.unit.main_state,
            sub = %ctx.unit.event_state,
            "unit state changed"
        );
        Status::Success
    }
}

/// Waits for the player to pick one of a fixed set of options.
///
/// The pick lands in `PlayerChoice` (text) and `PlayerChoiceIndex`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Choice {
    pub prompt: Option<String>,
    pub options: Vec<String>,
}

impl Choice {
    pub fn new(options: Vec<String>) -> Self {
        Self {
            prompt: None,
            options,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}

impl Default for Choice {
    fn default() -> Self {
        Self::new(vec!["Yes".to_owned(), "No".to_owned()])
    }
}

impl Behavior<StepContext<'_>> for Choice {
    fn tick(&self, ctx: &mut StepContext<'_>) -> Status {
        if self.options.is_empty() {
            warn!(unit = %ctx.unit.id, "choice without options skipped");
            return Status::Success;
        }
        if let Some(prompt) = &self.prompt {
            let text = super::message::substitute_tokens(prompt, ctx);
            ctx.display(&text, "white");
        }

        ctx.unit.event_state = EventSubState::Choosing;
        ctx.await_signal(Await::Choice {
            options: self.options.clone(),
        });
        Status::Running
    }

    fn is_blocking(&self) -> bool {
        true
    }

    fn cleanup(&self, ctx: &mut StepContext<'_>) {
        ctx.unit.event_state = EventSubState::Idle;
    }
}
