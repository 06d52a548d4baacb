//! Behavior steps events are built from.
//!
//! Every step implements [`Behavior`](behavior_tree::Behavior) over
//! [`StepContext`](super::StepContext). Steps are immutable template data;
//! anything that changes between visits lives in the instance state slot the
//! step names.
mod afflict;
mod compare;
mod control;
mod encounter;
mod gamble;
mod loot;
mod memoria;
mod message;
mod rest;
mod state;
mod trap;

pub use afflict::{Afflict, Affliction};
pub use compare::{Branches, Comparator, Comparison, NUMERIC_EPSILON, Operand};
pub use control::{CompleteEvent, TransformInto};
pub use encounter::{
    EncounterEntry, EncounterSelection, EncounterState, ResolveEncounter, StartEncounter,
};
pub use gamble::Gamble;
pub use loot::{LootChest, LootEntry, default_gold_table};
pub use memoria::{MemoriaChange, MemoriaCheck, MemoriaKind, MemoriaOperation, MemoriaTarget};
pub use message::{MessageLine, MessageStep, substitute_tokens};
pub use rest::RestSite;
pub use state::{Choice, StateChange};
pub use trap::{TrapPrompt, TrapResolve, TrapState, trap_damage};
