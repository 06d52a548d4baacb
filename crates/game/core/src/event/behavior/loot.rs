use behavior_tree::{Behavior, Status};
use tracing::{debug, error};

use crate::env::{pick_weighted_index, total_weight};
use crate::event::context::keys;
use crate::event::step::{Directive, StepContext};

/// One row of a loot table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LootEntry {
    pub kind: String,
    pub weight: u32,
    /// Draws left before the row is dropped.
    pub remaining: u32,
    /// Memoria gained.
    pub reward: i32,
    /// Damage taken.
    #[cfg_attr(feature = "serde", serde(default))]
    pub penalty: i32,
}

impl LootEntry {
    pub fn new(kind: impl Into<String>, weight: u32, remaining: u32, reward: i32) -> Self {
        Self {
            kind: kind.into(),
            weight,
            remaining,
            reward,
            penalty: 0,
        }
    }

    pub fn with_penalty(mut self, penalty: i32) -> Self {
        self.penalty = penalty;
        self
    }
}

/// Loot and mimic rows of the stock gold chest.
pub fn default_gold_table() -> Vec<LootEntry> {
    vec![
        LootEntry::new("low_loot", 10, 10, 10),
        LootEntry::new("medium_loot", 6, 6, 20),
        LootEntry::new("high_loot", 3, 3, 40),
        LootEntry::new("legendary_loot", 1, 1, 80),
        LootEntry::new("weak_mimic", 4, 4, 15).with_penalty(5),
        LootEntry::new("regular_mimic", 3, 3, 25).with_penalty(10),
        LootEntry::new("strong_mimic", 2, 2, 45).with_penalty(20),
        LootEntry::new("boss_mimic", 1, 1, 85).with_penalty(40),
    ]
}

/// Draws one row from a depleting weighted loot table.
///
/// The table is per instance: rows run out across visits to the same room.
/// A chest with nothing left turns into the fallback event.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LootChest {
    /// Instance state slot holding the live table.
    pub slot: String,
    pub table: Vec<LootEntry>,
    /// Event the chest becomes once empty; the configured default if unset.
    pub fallback: Option<String>,
}

impl LootChest {
    pub fn new(table: Vec<LootEntry>) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }
}

impl Default for LootChest {
    fn default() -> Self {
        Self {
            slot: "loot".to_owned(),
            table: default_gold_table(),
            fallback: None,
        }
    }
}

impl Behavior<StepContext<'_>> for LootChest {
    fn tick(&self, ctx: &mut StepContext<'_>) -> Status {
        let total = {
            let table = ctx
                .state
                .loot
                .entry(self.slot.clone())
                .or_insert_with(|| self.table.clone());
            total_weight(table, |entry| entry.weight)
        };

        if total == 0 {
            let into = ctx.fallback_event(self.fallback.as_deref());
            error!(unit = %ctx.unit.id, slot = %self.slot, into = %into, "loot table is empty");
            ctx.direct(Directive::Transform {
                into,
                restart: true,
            });
            return Status::Failure;
        }

        let roll = match ctx.roll_below(total) {
            Ok(roll) => roll,
            Err(err) => {
                error!(unit = %ctx.unit.id, error = %err, "cannot roll loot");
                return Status::Failure;
            }
        };

        let Some(table) = ctx.state.loot.get_mut(&self.slot) else {
            return Status::Failure;
        };
        let Some(index) = pick_weighted_index(table, |entry| entry.weight, roll) else {
            return Status::Failure;
        };

        let entry = &mut table[index];
        entry.remaining = entry.remaining.saturating_sub(1);
        let drawn = entry.clone();
        if drawn.remaining == 0 {
            table.remove(index);
        }

        debug!(
            unit = %ctx.unit.id,
            kind = %drawn.kind,
            reward = drawn.reward,
            penalty = drawn.penalty,
            remaining = drawn.remaining,
            "loot drawn"
        );

        ctx.unit.gain_memoria(drawn.reward);
        if drawn.penalty > 0 {
            ctx.unit.take_damage(drawn.penalty);
            ctx.update_health_display();
        }
        ctx.update_memoria_display(true);

        ctx.publish(keys::LOOT_TYPE, drawn.kind);
        ctx.publish(keys::LOOT_REWARD, drawn.reward);
        ctx.publish(keys::LOOT_PENALTY, drawn.penalty);
        ctx.publish_memoria();
        Status::Success
    }
}
