//! Shared key/value scratch space of a running event.
//!
//! Keys never have to exist: every typed read takes a default that is
//! returned for missing keys and for values of another type.

use std::collections::HashMap;
use std::fmt;

use super::scope::scoped_key;
use crate::state::{FloorId, RoomId, UnitId};

/// Well-known context keys.
pub mod keys {
    pub const UNIT: &str = "Unit";
    pub const UNIT_NAME: &str = "Name";
    pub const ROOM: &str = "Room";
    pub const FLOOR: &str = "Floor";
    pub const FLOOR_NUMBER: &str = "FloorNumber";
    pub const MEMORIA_REQUIRED: &str = "MemoriaRequired";
    pub const TOTAL_MEMORIA: &str = "TotalMemoria";
    pub const CURRENT_MEMORIA: &str = "CurrentMemoria";
    pub const LEVEL: &str = "Level";

    pub const MEMORIA_CHECK_PASSED: &str = "MemoriaCheckPassed";
    pub const MEMORIA_CHECK_FAILED: &str = "MemoriaCheckFailed";
    pub const REQUIRED_MEMORIA: &str = "RequiredMemoria";
    pub const LAST_MEMORIA_ADDED: &str = "LastMemoriaAdded";
    pub const LAST_MEMORIA_SUBTRACTED: &str = "LastMemoriaSubtracted";

    pub const PREVIOUS_MAIN_STATE: &str = "PreviousMainState";
    pub const PREVIOUS_EVENT_STATE: &str = "PreviousEventState";

    pub const PLAYER_CHOICE: &str = "PlayerChoice";
    pub const PLAYER_CHOICE_INDEX: &str = "PlayerChoiceIndex";

    pub const LOOT_TYPE: &str = "LootType";
    pub const LOOT_REWARD: &str = "LootReward";
    pub const LOOT_PENALTY: &str = "LootPenalty";

    pub const TRAP_DAMAGE: &str = "TrapDamage";
    pub const REMAINING_CHOICES: &str = "RemainingChoices";

    pub const ENEMY_NAME: &str = "EnemyName";
    pub const BATTLE_WON: &str = "BattleWon";

    pub const RESTED: &str = "Rested";
    pub const LEVELS_GAINED: &str = "LevelsGained";
    pub const GAMBLE_LOST: &str = "GambleLost";
    pub const AFFLICTION: &str = "Affliction";

    /// Token replaced by the unit's display name in messages.
    pub const PLAYER_TOKEN: &str = "PLAYER";
}

/// Dynamically typed context value.
#[derive(Clone, Debug, PartialEq)]
pub enum ContextValue {
    /// Explicit null.
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Unit(UnitId),
    Room(RoomId),
    Floor(FloorId),
}

impl ContextValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, ContextValue::Empty)
    }
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Empty => Ok(()),
            ContextValue::Bool(value) => write!(f, "{value}"),
            ContextValue::Int(value) => write!(f, "{value}"),
            ContextValue::Float(value) => write!(f, "{value}"),
            ContextValue::Text(value) => f.write_str(value),
            ContextValue::Unit(id) => write!(f, "{id}"),
            ContextValue::Room(id) => write!(f, "{id}"),
            ContextValue::Floor(id) => write!(f, "{id}"),
        }
    }
}

macro_rules! context_value_from {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for ContextValue {
                fn from(value: $ty) -> Self {
                    ContextValue::$variant(value $(as $cast)?)
                }
            }
        )*
    };
}

context_value_from! {
    bool => Bool,
    i32 => Int as i64,
    i64 => Int,
    u32 => Int as i64,
    f32 => Float as f64,
    f64 => Float,
    String => Text,
    UnitId => Unit,
    RoomId => Room,
    FloorId => Floor,
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Text(value.to_owned())
    }
}

/// Types that can be read back out of a [`ContextValue`].
pub trait ContextType: Sized {
    fn from_value(value: &ContextValue) -> Option<Self>;
}

impl ContextType for bool {
    fn from_value(value: &ContextValue) -> Option<Self> {
        match value {
            ContextValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl ContextType for i64 {
    fn from_value(value: &ContextValue) -> Option<Self> {
        match value {
            ContextValue::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl ContextType for i32 {
    fn from_value(value: &ContextValue) -> Option<Self> {
        match value {
            ContextValue::Int(value) => i32::try_from(*value).ok(),
            _ => None,
        }
    }
}

impl ContextType for f64 {
    fn from_value(value: &ContextValue) -> Option<Self> {
        match value {
            ContextValue::Float(value) => Some(*value),
            _ => None,
        }
    }
}

impl ContextType for String {
    fn from_value(value: &ContextValue) -> Option<Self> {
        match value {
            ContextValue::Text(value) => Some(value.clone()),
            _ => None,
        }
    }
}

impl ContextType for UnitId {
    fn from_value(value: &ContextValue) -> Option<Self> {
        match value {
            ContextValue::Unit(id) => Some(*id),
            _ => None,
        }
    }
}

impl ContextType for RoomId {
    fn from_value(value: &ContextValue) -> Option<Self> {
        match value {
            ContextValue::Room(id) => Some(*id),
            _ => None,
        }
    }
}

impl ContextType for FloorId {
    fn from_value(value: &ContextValue) -> Option<Self> {
        match value {
            ContextValue::Floor(id) => Some(*id),
            _ => None,
        }
    }
}

/// String-keyed bag of values shared by the steps of an event.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventContext {
    values: HashMap<String, ContextValue>,
}

impl EventContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Typed read. Missing keys and type mismatches yield `default`.
    pub fn get<T: ContextType>(&self, key: &str, default: T) -> T {
        self.values
            .get(key)
            .and_then(T::from_value)
            .unwrap_or(default)
    }

    /// Typed read that tells a miss apart from a stored default.
    pub fn try_get<T: ContextType>(&self, key: &str) -> Option<T> {
        self.values.get(key).and_then(T::from_value)
    }

    pub fn get_value(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ContextValue> {
        self.values.remove(key)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Removes every key starting with `prefix`. Returns how many went.
    pub fn remove_prefix(&mut self, prefix: &str) -> usize {
        let before = self.values.len();
        self.values.retain(|key, _| !key.starts_with(prefix));
        before - self.values.len()
    }

    /// Copies every entry of `other` into this context, overwriting.
    pub fn merge(&mut self, other: &EventContext) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    // ===== unit scoping =====

    /// Writes `value` under both the scoped and the bare form of `key`.
    pub fn publish(&mut self, scope: u32, key: &str, value: impl Into<ContextValue>) {
        let value = value.into();
        self.values.insert(scoped_key(scope, key), value.clone());
        self.values.insert(key.to_owned(), value);
    }

    /// Reads the scoped form of `key`, falling back to the bare key.
    pub fn lookup(&self, scope: u32, key: &str) -> Option<&ContextValue> {
        self.values
            .get(&scoped_key(scope, key))
            .or_else(|| self.values.get(key))
    }

    /// Typed form of [`lookup`](Self::lookup).
    pub fn lookup_as<T: ContextType>(&self, scope: u32, key: &str, default: T) -> T {
        self.lookup(scope, key)
            .and_then(T::from_value)
            .unwrap_or(default)
    }

    // ===== well-known keys =====

    pub fn unit(&self) -> Option<UnitId> {
        self.try_get(keys::UNIT)
    }

    pub fn room(&self) -> Option<RoomId> {
        self.try_get(keys::ROOM)
    }

    pub fn floor(&self) -> Option<FloorId> {
        self.try_get(keys::FLOOR)
    }

    pub fn memoria_required(&self) -> Option<i32> {
        self.try_get(keys::MEMORIA_REQUIRED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_mismatched_reads_return_default() {
        let mut ctx = EventContext::new();
        assert!(!ctx.get("MemoriaCheckPassed", false));

        ctx.set("Count", 3);
        assert_eq!(ctx.get("Count", 0i32), 3);
        assert_eq!(ctx.get("Count", String::from("none")), "none");
        assert!(!ctx.get("Count", false));
    }

    #[test]
    fn remove_prefix_only_touches_matching_keys() {
        let mut ctx = EventContext::new();
        ctx.set("Unit1_Name", "Aria");
        ctx.set("Unit1_TotalMemoria", 10);
        ctx.set("Unit12_Name", "Bram");
        ctx.set(keys::MEMORIA_REQUIRED, 100);

        assert_eq!(ctx.remove_prefix("Unit1_"), 2);
        assert!(ctx.has("Unit12_Name"));
        assert_eq!(ctx.memoria_required(), Some(100));
    }

    #[test]
    fn scoped_reads_win_over_bare_keys() {
        let mut ctx = EventContext::new();
        ctx.publish(1, keys::PLAYER_CHOICE, "Yes");
        ctx.publish(2, keys::PLAYER_CHOICE, "No");

        assert_eq!(ctx.lookup_as(1, keys::PLAYER_CHOICE, String::new()), "Yes");
        assert_eq!(ctx.lookup_as(2, keys::PLAYER_CHOICE, String::new()), "No");
        // Unscoped readers see the latest write.
        assert_eq!(ctx.lookup_as(3, keys::PLAYER_CHOICE, String::new()), "No");
    }

    #[test]
    fn values_render_for_substitution() {
        assert_eq!(ContextValue::from(true).to_string(), "true");
        assert_eq!(ContextValue::from(42).to_string(), "42");
        assert_eq!(ContextValue::from("abc").to_string(), "abc");
        assert_eq!(ContextValue::Empty.to_string(), "");
    }
}
