//! Resource pools.
//!
//! - Health: `0 ≤ current ≤ max`
//! - Memoria: `current ≥ 0`; `total` is the lifetime high-water mark and only
//!   moves down through an explicit total adjustment
//! - Stance: `0 ≤ current ≤ max`, with `max` derived from attributes
//!
//! Formula:
//! - Stance_max = max(1, ⌊(2 × (FT + WI) + KT + SY + HP_max / 10) / 6⌋)

use super::attributes::Attributes;

/// Health of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthPool {
    current: i32,
    max: i32,
}

impl HealthPool {
    /// A full pool. Negative maximums are treated as zero.
    pub fn full(max: i32) -> Self {
        let max = max.max(0);
        Self { current: max, max }
    }

    pub fn new(current: i32, max: i32) -> Self {
        let max = max.max(0);
        Self {
            current: current.clamp(0, max),
            max,
        }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Removes up to `amount` health and returns how much was actually lost.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0).min(self.current);
        self.current -= amount;
        amount
    }

    /// Restores up to `amount` health and returns how much was actually gained.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0).min(self.max - self.current);
        self.current += amount;
        amount
    }

    pub fn restore_full(&mut self) {
        self.current = self.max;
    }

    /// Changes the maximum, pulling the current value down if needed.
    pub fn set_max(&mut self, max: i32) {
        self.max = max.max(0);
        self.current = self.current.min(self.max);
    }
}

/// Memoria (currency/experience) of a unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoriaPool {
    current: i32,
    total: i32,
}

impl MemoriaPool {
    pub fn new(current: i32, total: i32) -> Self {
        Self {
            current: current.max(0),
            total: total.max(0),
        }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn total(&self) -> i32 {
        self.total
    }

    /// Earned memoria: raises both the spendable and the lifetime amount.
    pub fn gain(&mut self, amount: i32) {
        let amount = amount.max(0);
        self.current += amount;
        self.total += amount;
    }

    /// Spends or loses memoria. Only the current amount is affected.
    /// Returns how much was actually removed.
    pub fn lose(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0).min(self.current);
        self.current -= amount;
        amount
    }

    pub fn add_current(&mut self, amount: i32) {
        self.current = (self.current + amount.max(0)).max(0);
    }

    pub fn add_total(&mut self, amount: i32) {
        self.total = (self.total + amount.max(0)).max(0);
    }

    /// Lowers the lifetime amount explicitly, clamped at zero.
    pub fn subtract_total(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0).min(self.total);
        self.total -= amount;
        amount
    }

    pub fn set_current(&mut self, value: i32) {
        self.current = value.max(0);
    }

    pub fn set_total(&mut self, value: i32) {
        self.total = value.max(0);
    }
}

/// Stance (poise) of a unit. Reaching zero breaks the stance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StancePool {
    current: i32,
    max: i32,
}

impl StancePool {
    pub fn full(max: i32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    /// Derives the maximum from attributes and maximum health.
    pub fn max_for(attributes: &Attributes, max_health: i32) -> i32 {
        let weighted = 2 * (attributes.fortitude + attributes.willpower)
            + attributes.kismet
            + attributes.synapsis
            + max_health / 10;
        weighted.div_euclid(6).max(1)
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_broken(&self) -> bool {
        self.current == 0
    }

    /// Lowers stance, clamped at zero.
    pub fn reduce(&mut self, amount: i32) {
        self.current = (self.current - amount.max(0)).max(0);
    }

    /// Raises stance, clamped at the maximum.
    pub fn recover(&mut self, amount: i32) {
        self.current = (self.current + amount.max(0)).min(self.max);
    }

    pub fn reset(&mut self) {
        self.current = self.max;
    }

    /// Changes the maximum, pulling the current value down if needed.
    pub fn set_max(&mut self, max: i32) {
        self.max = max.max(1);
        self.current = self.current.min(self.max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_stays_within_bounds() {
        let mut hp = HealthPool::full(30);
        assert_eq!(hp.take_damage(50), 30);
        assert_eq!(hp.current(), 0);
        assert!(!hp.is_alive());

        assert_eq!(hp.heal(100), 30);
        assert_eq!(hp.current(), 30);

        assert_eq!(hp.take_damage(-5), 0);
        assert_eq!(hp.current(), 30);

        hp.set_max(10);
        assert_eq!(hp.current(), 10);
    }

    #[test]
    fn memoria_loss_never_touches_total() {
        let mut memoria = MemoriaPool::default();
        memoria.gain(40);
        assert_eq!((memoria.current(), memoria.total()), (40, 40));

        assert_eq!(memoria.lose(100), 40);
        assert_eq!((memoria.current(), memoria.total()), (0, 40));
    }

    #[test]
    fn stance_max_has_a_floor_of_one() {
        assert_eq!(StancePool::max_for(&Attributes::default(), 0), 1);

        let attrs = Attributes {
            fortitude: 4,
            willpower: 2,
            kismet: 3,
            synapsis: 3,
            ..Attributes::default()
        };
        // (2 * 6 + 3 + 3 + 100 / 10) / 6 = 28 / 6 = 4
        assert_eq!(StancePool::max_for(&attrs, 100), 4);
    }

    #[test]
    fn stance_clamps_both_ways() {
        let mut stance = StancePool::full(3);
        stance.reduce(5);
        assert!(stance.is_broken());
        stance.recover(10);
        assert_eq!(stance.current(), 3);
    }
}
