//! Lightweight step-sequencing library for turn-based games.
//!
//! This library provides a minimal, deterministic behavior abstraction for
//! scripted sequences that may have to wait on the outside world.
//!
//! - **No delta time**: A tick either finishes or reports `Running`
//! - **Resumable**: Suspension is an explicit cursor, not a coroutine
//! - **Minimal state**: Steps are immutable; runs own their cursors
//! - **Zero dependencies**: Pure Rust with no external crates
//!
//! # Architecture
//!
//! - [`Behavior`]: Core trait for all steps
//! - [`Status`]: Success, Failure or Running
//! - [`Chain`]: Ordered runner with blocking/non-blocking semantics
//! - [`ChainCursor`]: Resume point owned by whoever drives the chain

pub mod behavior;
pub mod chain;
pub mod status;

// Re-export core types for ergonomic API
pub use behavior::Behavior;
pub use chain::{Chain, ChainControl, ChainCursor, ChainOutcome};
pub use status::Status;
