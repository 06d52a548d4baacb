//! Timed message display for blocking message steps.

use std::collections::VecDeque;

use crate::env::PresentationSink;

/// Width of the dashed border drawn around bordered messages.
pub const BORDER_WIDTH: usize = 50;

/// One line of text waiting to be shown.
#[derive(Clone, Debug, PartialEq)]
pub struct QueuedMessage {
    pub text: String,
    pub color: String,
    /// Seconds the line stays up before the next one.
    pub duration: f32,
    /// Border color, when the line is framed.
    pub border: Option<String>,
}

/// Shows one message, framed by dashed lines when it has a border.
pub fn show(message: &QueuedMessage, sink: &dyn PresentationSink) {
    match &message.border {
        Some(color) => {
            let border = "-".repeat(BORDER_WIDTH);
            sink.display_message(&border, color);
            sink.display_message(&message.text, &message.color);
            sink.display_message(&border, color);
        }
        None => sink.display_message(&message.text, &message.color),
    }
}

/// Messages shown one after another, each held for its duration.
#[derive(Clone, Debug, Default)]
pub struct MessageQueue {
    pending: VecDeque<QueuedMessage>,
    remaining: f32,
}

impl MessageQueue {
    pub fn new(messages: Vec<QueuedMessage>) -> Self {
        Self {
            pending: messages.into(),
            remaining: 0.0,
        }
    }

    /// Shows the first message and starts its timer.
    pub fn begin(&mut self, sink: Option<&dyn PresentationSink>) {
        if let Some(first) = self.pending.pop_front() {
            if let Some(sink) = sink {
                show(&first, sink);
            }
            self.remaining = first.duration.max(0.0);
        }
    }

    /// Advances the timers by `dt` seconds, showing messages as they come
    /// due. Returns `true` once the last message has been up for its full
    /// duration.
    pub fn advance(&mut self, dt: f32, sink: Option<&dyn PresentationSink>) -> bool {
        self.remaining -= dt;
        while self.remaining <= 0.0 {
            let Some(next) = self.pending.pop_front() else {
                return true;
            };
            if let Some(sink) = sink {
                show(&next, sink);
            }
            self.remaining += next.duration.max(0.0);
        }
        false
    }

    /// Shows every message not yet shown, without waiting.
    pub fn flush(&mut self, sink: Option<&dyn PresentationSink>) {
        for message in self.pending.drain(..) {
            if let Some(sink) = sink {
                show(&message, sink);
            }
        }
        self.remaining = 0.0;
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty() && self.remaining <= 0.0
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl PresentationSink for Recorder {
        fn display_message(&self, text: &str, _color: &str) {
            if let Ok(mut lines) = self.0.lock() {
                lines.push(text.to_owned());
            }
        }

        fn update_health_display(&self, _current: i32, _max: i32) {}

        fn update_memoria_display(&self, _current: i32, _total: i32, _is_gain: bool) {}
    }

    fn message(text: &str, duration: f32) -> QueuedMessage {
        QueuedMessage {
            text: text.to_owned(),
            color: "white".to_owned(),
            duration,
            border: None,
        }
    }

    #[test]
    fn messages_come_due_one_at_a_time() {
        let sink = Recorder::default();
        let mut queue = MessageQueue::new(vec![message("one", 1.0), message("two", 1.0)]);

        queue.begin(Some(&sink));
        assert!(!queue.advance(0.5, Some(&sink)));
        assert_eq!(sink.0.lock().map(|l| l.len()).unwrap_or(0), 1);

        assert!(!queue.advance(0.6, Some(&sink)));
        assert_eq!(sink.0.lock().map(|l| l.len()).unwrap_or(0), 2);

        assert!(queue.advance(1.0, Some(&sink)));
    }

    #[test]
    fn flushing_shows_the_rest_at_once() {
        let sink = Recorder::default();
        let mut queue = MessageQueue::new(vec![
            message("one", 5.0),
            message("two", 5.0),
            message("three", 5.0),
        ]);

        queue.begin(Some(&sink));
        queue.flush(Some(&sink));

        let lines = sink.0.lock().map(|l| l.clone()).unwrap_or_default();
        assert_eq!(lines, vec!["one", "two", "three"]);
        assert!(queue.is_finished());
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn borders_frame_the_text() {
        let sink = Recorder::default();
        let mut framed = message("framed", 0.0);
        framed.border = Some("gray".to_owned());

        show(&framed, &sink);
        let lines = sink.0.lock().map(|l| l.clone()).unwrap_or_default();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "-".repeat(BORDER_WIDTH));
        assert_eq!(lines[1], "framed");
    }
}
