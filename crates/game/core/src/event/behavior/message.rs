use std::sync::LazyLock;

use behavior_tree::{Behavior, Status};
use regex_lite::{Captures, Regex};
use tracing::{error, warn};

use crate::event::context::keys;
use crate::event::messages::QueuedMessage;
use crate::event::step::{Await, StepContext};

static TOKEN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").ok());

/// Replaces `{KEY}` tokens with context values.
///
/// Lookup order: the unit's scoped key, the bare key, then `{PLAYER}` as
/// the unit's name. Unresolved tokens stay in the text.
pub fn substitute_tokens(text: &str, ctx: &StepContext<'_>) -> String {
    let Some(pattern) = TOKEN.as_ref() else {
        error!("message token pattern failed to compile");
        return text.to_owned();
    };

    pattern
        .replace_all(text, |caps: &Captures<'_>| {
            let key = &caps[1];
            if let Some(value) = ctx.lookup(key) {
                return value.to_string();
            }
            if key == keys::PLAYER_TOKEN {
                return ctx.unit.name.clone();
            }
            warn!(unit = %ctx.unit.id, token = key, "unresolved message token");
            caps[0].to_owned()
        })
        .into_owned()
}

/// One line of a message step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MessageLine {
    pub text: String,
    pub color: String,
    /// Seconds on screen; the configured default when absent.
    pub duration: Option<f32>,
}

impl MessageLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn colored(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn lasting(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds);
        self
    }
}

impl Default for MessageLine {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: "white".to_owned(),
            duration: None,
        }
    }
}

/// Shows lines of text with token substitution.
///
/// Blocking with `wait_between` queues the lines and suspends the event
/// until each has been up for its duration. Otherwise every line is shown
/// at once.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MessageStep {
    pub lines: Vec<MessageLine>,
    pub blocking: bool,
    pub wait_between: bool,
    pub bordered: bool,
}

impl MessageStep {
    pub fn new(lines: Vec<MessageLine>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![MessageLine::new(text)])
    }

    /// Blocking, one line at a time.
    pub fn timed(mut self) -> Self {
        self.blocking = true;
        self.wait_between = true;
        self
    }

    pub fn bordered(mut self) -> Self {
        self.bordered = true;
        self
    }
}

impl Behavior<StepContext<'_>> for MessageStep {
    fn tick(&self, ctx: &mut StepContext<'_>) -> Status {
        let messages: Vec<QueuedMessage> = self
            .lines
            .iter()
            .map(|line| QueuedMessage {
                text: substitute_tokens(&line.text, ctx),
                color: line.color.clone(),
                duration: line.duration.unwrap_or(ctx.config.message_duration),
                border: self.bordered.then(|| ctx.config.border_color.clone()),
            })
            .collect();

        if self.blocking && self.wait_between && !messages.is_empty() {
            for message in messages {
                ctx.queue_message(message);
            }
            ctx.await_signal(Await::Messages);
            return Status::Running;
        }

        for message in &messages {
            ctx.display_message(message);
        }
        Status::Success
    }

    fn is_blocking(&self) -> bool {
        self.blocking
    }
}
