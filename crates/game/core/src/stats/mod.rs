//! Unit statistics.
//!
//! # Layers
//!
//! ```text
//! [ Attributes ]  eight mutable integers, shifted by status modifiers
//!      ↓
//! [ Pools ]       health, memoria, stance (stance max derived)
//! ```
//!
//! Every attribute change recomputes the derived stance maximum; current
//! pool values are the only stored state besides the attributes themselves.

pub mod attributes;
pub mod resources;

pub use attributes::{Attribute, Attributes, StatModifier};
pub use resources::{HealthPool, MemoriaPool, StancePool};
