//! Status effect ledger.
//!
//! Ailments are immutable templates shared through the [`Registry`]. A unit
//! carries at most one [`StatusEffect`] per ailment name; applying an ailment
//! that is already active refreshes its duration instead of stacking.
//!
//! # Tick order
//!
//! Ticks happen once per turn of the owning unit:
//! 1. A freshly applied effect only marks itself as applied
//! 2. Permanent effects fire their tick hooks and never expire
//! 3. Timed effects deal damage over time, fire tick hooks, count down and
//!    are removed when the counter reaches zero
//!
//! [`Registry`]: crate::Registry
mod ailment;
mod ledger;

pub use ailment::{Ailment, AilmentEffect, AilmentFlags};
pub use ledger::{StatusEffect, StatusLedger};
