//! Immutable event templates and their per-trigger instances.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use behavior_tree::Chain;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::behavior::{EncounterState, LootEntry, TrapState};
use super::error::EventError;
use super::step::{EventStep, StepBehavior};
use crate::state::RoomId;

/// Broad family of an event, used by room assignment and presentation.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventCategory {
    Encounter,
    GoodOmen,
    BadOmen,
    #[default]
    Progression,
}

/// Named, ordered list of behavior steps. Shared by every instance.
pub struct EventTemplate {
    name: String,
    category: EventCategory,
    chain: Chain<StepBehavior>,
}

impl EventTemplate {
    pub fn new(name: impl Into<String>, category: EventCategory, steps: Vec<EventStep>) -> Self {
        Self {
            name: name.into(),
            category,
            chain: Chain::new(steps),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> EventCategory {
        self.category
    }

    pub fn chain(&self) -> &Chain<StepBehavior> {
        &self.chain
    }
}

impl fmt::Debug for EventTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTemplate")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("steps", &self.chain.len())
            .finish()
    }
}

/// Supplies templates when none were handed to the manager directly.
pub trait TemplateSource {
    /// # Errors
    ///
    /// Returns `EventError::TemplateSource` when the templates cannot be produced.
    fn load_templates(&self) -> Result<Vec<EventTemplate>, EventError>;
}

/// Identifier of an event instance inside one manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(pub u32);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance#{}", self.0)
    }
}

/// Mutable runtime data of stateful steps, keyed by each step's slot name.
///
/// Slots are seeded from the step's template data on first use.
#[derive(Clone, Debug, Default)]
pub struct InstanceState {
    pub loot: HashMap<String, Vec<LootEntry>>,
    pub traps: HashMap<String, TrapState>,
    pub encounters: HashMap<String, EncounterState>,
}

/// One triggered copy of a template.
#[derive(Debug)]
pub struct EventInstance {
    pub id: InstanceId,
    pub template: Arc<EventTemplate>,
    /// Room this instance is bound to; bound instances persist across visits.
    pub room: Option<RoomId>,
    pub state: InstanceState,
}

impl EventInstance {
    pub fn new(id: InstanceId, template: Arc<EventTemplate>, room: Option<RoomId>) -> Self {
        Self {
            id,
            template,
            room,
            state: InstanceState::default(),
        }
    }

    pub fn name(&self) -> &str {
        self.template.name()
    }
}

/// Where a unit's event run currently stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    Suspended,
    Completed,
}
