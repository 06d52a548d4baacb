//! Types surfaced to runtime consumers.
mod errors;

pub use errors::{Result, RuntimeError};
