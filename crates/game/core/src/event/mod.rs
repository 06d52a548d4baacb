//! Event engine.
//!
//! Events are named [`EventTemplate`]s: ordered chains of behavior steps.
//! The [`EventManager`] instantiates a template per trigger (or per room),
//! runs it for a unit against a shared [`EventContext`], and suspends it
//! whenever a blocking step waits on messages, a choice or a battle.
//!
//! # Module layout
//!
//! - `assignment`: weighted room-to-event table
//! - `behavior`: the step catalog
//! - `context`: dynamically typed key/value bag and well-known keys
//! - `definition`: data form of templates for content files
//! - `manager`: templates, runs, rooms and notifications
//! - `messages`: timed message display
//! - `scope`: per-unit key scoping
//! - `step`: the context handed to each step
//! - `template`: templates, instances and run phases
mod assignment;
pub mod behavior;
mod context;
mod definition;
mod error;
mod manager;
mod messages;
mod scope;
mod step;
mod template;

pub use assignment::{AssignmentTable, CategoryTable, WeightedName};
pub use context::{ContextType, ContextValue, EventContext, keys};
pub use definition::{BranchesDef, CompareDef, EventDef, MemoriaCheckDef, StepDef};
pub use error::EventError;
pub use manager::{EventManager, EventNotice};
pub use messages::{BORDER_WIDTH, MessageQueue, QueuedMessage, show};
pub use scope::{UnitScopes, scope_prefix, scoped_key};
pub use step::{Await, Directive, EventStep, Outbox, StepBehavior, StepContext};
pub use template::{
    EventCategory, EventInstance, EventTemplate, InstanceId, InstanceState, RunPhase,
    TemplateSource,
};
