use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::UnitId;
use crate::stats::{Attribute, Attributes, HealthPool, MemoriaPool, StancePool, StatModifier};
use crate::status::StatusLedger;
use crate::symptom::SymptomLedger;

/// Coarse activity of a unit outside battle.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MainState {
    #[default]
    Idle,
    Move,
    Inventory,
    InEvent,
}

/// Fine-grained state while a unit is inside an event.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventSubState {
    #[default]
    Idle,
    Choosing,
}

/// Attribute, health, memoria and stance data of a player or enemy unit.
///
/// Pools are private so every mutation goes through a method that keeps the
/// invariants: health stays in `0..=max`, memoria never goes negative and
/// stance max is recomputed whenever an attribute or max health changes.
#[derive(Clone, Debug)]
pub struct UnitRecord {
    pub id: UnitId,
    pub name: String,
    pub level: u32,
    /// Memoria handed to whoever defeats this unit, on top of its current memoria.
    pub memoria_loot: i32,
    pub main_state: MainState,
    pub event_state: EventSubState,
    attributes: Attributes,
    health: HealthPool,
    stance: StancePool,
    memoria: MemoriaPool,
    pub(crate) statuses: StatusLedger,
    pub(crate) symptoms: SymptomLedger,
}

impl UnitRecord {
    /// Creates a level 1 unit at full health and full stance with no memoria.
    pub fn new(id: UnitId, name: impl Into<String>, attributes: Attributes, max_health: i32) -> Self {
        let health = HealthPool::full(max_health);
        Self {
            id,
            name: name.into(),
            level: 1,
            memoria_loot: 0,
            main_state: MainState::Idle,
            event_state: EventSubState::Idle,
            attributes,
            health,
            stance: StancePool::full(StancePool::max_for(&attributes, health.max())),
            memoria: MemoriaPool::default(),
            statuses: StatusLedger::default(),
            symptoms: SymptomLedger::default(),
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.max(1);
        self
    }

    pub fn with_memoria(mut self, current: i32, total: i32) -> Self {
        self.memoria = MemoriaPool::new(current, total);
        self
    }

    pub fn with_loot(mut self, memoria_loot: i32) -> Self {
        self.memoria_loot = memoria_loot.max(0);
        self
    }

    // ===== read access =====

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, attribute: Attribute) -> i32 {
        self.attributes.get(attribute)
    }

    pub fn health(&self) -> HealthPool {
        self.health
    }

    pub fn stance(&self) -> StancePool {
        self.stance
    }

    pub fn memoria(&self) -> MemoriaPool {
        self.memoria
    }

    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    // ===== attributes =====

    pub fn set_attribute(&mut self, attribute: Attribute, value: i32) {
        self.attributes.set(attribute, value);
        self.recompute_stance();
    }

    pub fn apply_modifier(&mut self, modifier: StatModifier) {
        self.attributes.apply(modifier);
        self.recompute_stance();
    }

    fn recompute_stance(&mut self) {
        self.stance
            .set_max(StancePool::max_for(&self.attributes, self.health.max()));
    }

    // ===== health =====

    /// Returns the health actually lost.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.health.take_damage(amount)
    }

    /// Returns the health actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        self.health.heal(amount)
    }

    pub fn restore_health(&mut self) {
        self.health.restore_full();
    }

    pub fn set_max_health(&mut self, max: i32) {
        self.health.set_max(max);
        self.recompute_stance();
    }

    // ===== stance =====

    pub fn reduce_stance(&mut self, amount: i32) {
        self.stance.reduce(amount);
    }

    pub fn recover_stance(&mut self, amount: i32) {
        self.stance.recover(amount);
    }

    pub fn reset_stance(&mut self) {
        self.stance.reset();
    }

    // ===== memoria =====

    /// Adds to both current and total memoria.
    pub fn gain_memoria(&mut self, amount: i32) {
        self.memoria.gain(amount);
    }

    /// Spends current memoria. Total is untouched. Returns the amount removed.
    pub fn lose_memoria(&mut self, amount: i32) -> i32 {
        self.memoria.lose(amount)
    }

    pub fn add_current_memoria(&mut self, amount: i32) {
        self.memoria.add_current(amount);
    }

    pub fn add_total_memoria(&mut self, amount: i32) {
        self.memoria.add_total(amount);
    }

    /// Explicit total adjustment. Returns the amount removed.
    pub fn subtract_total_memoria(&mut self, amount: i32) -> i32 {
        self.memoria.subtract_total(amount)
    }

    pub fn set_current_memoria(&mut self, value: i32) {
        self.memoria.set_current(value);
    }

    pub fn set_total_memoria(&mut self, value: i32) {
        self.memoria.set_total(value);
    }

    // ===== progression =====

    /// Raises the level, grows max health by `health_gain` and heals fully.
    pub fn level_up(&mut self, health_gain: i32) {
        self.level += 1;
        self.set_max_health(self.health.max() + health_gain.max(0));
        self.health.restore_full();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> UnitRecord {
        UnitRecord::new(UnitId(1), "Tester", Attributes::uniform(3), 40)
    }

    #[test]
    fn health_stays_in_bounds() {
        let mut unit = unit();
        assert_eq!(unit.take_damage(100), 40);
        assert_eq!(unit.health().current(), 0);
        assert!(!unit.is_alive());

        assert_eq!(unit.heal(500), 40);
        assert_eq!(unit.health().current(), 40);

        assert_eq!(unit.take_damage(-5), 0);
        assert_eq!(unit.heal(-5), 0);
    }

    #[test]
    fn attribute_change_recomputes_stance() {
        let mut unit = unit();
        // (2 * (3 + 3) + 3 + 3 + 40 / 10) / 6 = 22 / 6 = 3
        assert_eq!(unit.stance().max(), 3);

        unit.set_attribute(Attribute::Fortitude, 12);
        // (2 * (12 + 3) + 3 + 3 + 4) / 6 = 40 / 6 = 6
        assert_eq!(unit.stance().max(), 6);
    }

    #[test]
    fn lose_memoria_keeps_total() {
        let mut unit = unit().with_memoria(30, 30);
        unit.gain_memoria(20);
        assert_eq!(unit.lose_memoria(100), 50);
        assert_eq!(unit.memoria().current(), 0);
        assert_eq!(unit.memoria().total(), 50);
    }

    #[test]
    fn level_up_grows_and_heals() {
        let mut unit = unit();
        unit.take_damage(15);
        unit.level_up(10);
        assert_eq!(unit.level, 2);
        assert_eq!(unit.health().max(), 50);
        assert_eq!(unit.health().current(), 50);
    }

    #[test]
    fn state_names_parse() {
        assert_eq!("in_event".parse::<MainState>().ok(), Some(MainState::InEvent));
        assert_eq!(EventSubState::Choosing.to_string(), "choosing");
    }
}
