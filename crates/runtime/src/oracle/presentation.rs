//! Recording [`game_core::PresentationSink`] that mirrors onto the bus.
use game_core::PresentationSink;
use std::sync::Mutex;
use tracing::debug;

use crate::events::{Event, EventBus, PresentationEvent};

/// Keeps everything the core asked to show, in order.
///
/// With a bus attached every entry is also published on
/// [`Topic::Presentation`](crate::events::Topic::Presentation).
#[derive(Debug, Default)]
pub struct MessageLog {
    entries: Mutex<Vec<PresentationEvent>>,
    bus: Option<EventBus>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bus(bus: EventBus) -> Self {
        Self {
            entries: Mutex::default(),
            bus: Some(bus),
        }
    }

    /// Everything recorded so far.
    pub fn entries(&self) -> Vec<PresentationEvent> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Text of every displayed message.
    pub fn lines(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                PresentationEvent::Message { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    fn record(&self, entry: PresentationEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(Event::Presentation(entry.clone()));
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}

impl PresentationSink for MessageLog {
    fn display_message(&self, text: &str, color: &str) {
        debug!(color, "{text}");
        self.record(PresentationEvent::Message {
            text: text.to_owned(),
            color: color.to_owned(),
        });
    }

    fn update_health_display(&self, current: i32, max: i32) {
        self.record(PresentationEvent::Health { current, max });
    }

    fn update_memoria_display(&self, current: i32, total: i32, is_gain: bool) {
        self.record(PresentationEvent::Memoria {
            current,
            total,
            is_gain,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Topic;

    #[test]
    fn records_in_order_and_publishes() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe(Topic::Presentation);
        let log = MessageLog::with_bus(bus);

        log.display_message("A chest.", "gold");
        log.update_memoria_display(10, 10, true);

        assert_eq!(log.lines(), vec!["A chest."]);
        assert_eq!(log.entries().len(), 2);
        assert!(matches!(
            rx.try_recv(),
            Ok(Event::Presentation(PresentationEvent::Message { ref color, .. })) if color == "gold"
        ));

        log.clear();
        assert!(log.entries().is_empty());
    }
}
