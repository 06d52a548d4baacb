//! Unit records and the identifiers used to refer to them.
//!
//! A [`UnitRecord`] is the only mutable game entity in the core: events,
//! battles, ailments and symptoms all mutate units through the guarded
//! methods defined here and in the `status`/`symptom` modules.
mod ids;
mod unit;

pub use ids::{FloorId, RoomId, UnitId};
pub use unit::{EventSubState, MainState, UnitRecord};
