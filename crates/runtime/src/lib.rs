//! Session orchestration for the dungeon core.
//!
//! This crate wires the event manager, the battle system and the in-memory
//! oracles into a single [`GameSession`]. Consumers drive the session with
//! room visits, choices and frame ticks, and subscribe to the [`EventBus`]
//! to learn what happened.
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the composition root and its builder
//! - [`api`] exposes the error type downstream clients handle
//! - [`events`] provides the topic-based event bus
//! - [`oracle`] provides the floor, presentation and enemy adapters
pub mod api;
pub mod events;
pub mod oracle;
pub mod session;

pub use api::{Result, RuntimeError};
pub use events::{BattleEvent, Event, EventBus, LifecycleEvent, PresentationEvent, Topic};
pub use oracle::{EnemyCatalog, FloorInfo, FloorLayout, MessageLog, OracleManager};
pub use session::{BattlePacing, GameSession, SessionBuilder, SessionConfig};
