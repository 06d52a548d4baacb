//! Combat resolution.
//!
//! Basic attacks and the stance/stagger mechanic shared by the battle loop.
//!
//! # Formulas
//!
//! - Damage = max(0, base + AG(attacker) - FT(defender))
//! - Damage is doubled against a defender carrying a vulnerable ailment
//! - Every attack that lands on a living defender costs it one stance point
//! - Stance reaching zero applies the configured stagger ailment once

mod attack;
mod stagger;

pub use attack::{AttackReport, basic_attack, calculate_damage};
pub use stagger::{break_stance, is_action_blocked, is_staggered};
