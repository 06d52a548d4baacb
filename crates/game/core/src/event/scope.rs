//! Per-unit key scoping.
//!
//! Two units inside the same event instance share its context. Data that
//! belongs to one of them is stored under `Unit{n}_{key}`, where `n` is a
//! small integer assigned on first use and stable for the session.

use std::collections::HashMap;

use crate::state::UnitId;

/// Builds the scoped form of `base` for scope number `scope`.
pub fn scoped_key(scope: u32, base: &str) -> String {
    format!("Unit{scope}_{base}")
}

/// Prefix shared by every key of scope number `scope`.
pub fn scope_prefix(scope: u32) -> String {
    format!("Unit{scope}_")
}

/// Monotonic scope numbers per unit.
#[derive(Clone, Debug, Default)]
pub struct UnitScopes {
    next: u32,
    assigned: HashMap<UnitId, u32>,
}

impl UnitScopes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope number of `unit`, assigning the next one on first use.
    pub fn scope_of(&mut self, unit: UnitId) -> u32 {
        *self.assigned.entry(unit).or_insert_with(|| {
            self.next += 1;
            self.next
        })
    }

    pub fn get(&self, unit: UnitId) -> Option<u32> {
        self.assigned.get(&unit).copied()
    }

    pub fn key(&mut self, unit: UnitId, base: &str) -> String {
        scoped_key(self.scope_of(unit), base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_are_stable_and_sequential() {
        let mut scopes = UnitScopes::new();
        assert_eq!(scopes.key(UnitId(9), "Name"), "Unit1_Name");
        assert_eq!(scopes.key(UnitId(4), "Name"), "Unit2_Name");
        assert_eq!(scopes.key(UnitId(9), "TotalMemoria"), "Unit1_TotalMemoria");
        assert_eq!(scopes.get(UnitId(4)), Some(2));
        assert_eq!(scopes.get(UnitId(5)), None);
    }
}
