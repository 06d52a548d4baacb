use serde::{Deserialize, Serialize};

use game_core::{BattleOutcome, EventNotice, UnitId};

/// Progress of event runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    Started {
        unit: UnitId,
        event: String,
    },
    Finished {
        unit: UnitId,
        event: String,
        success: bool,
    },
    Transformed {
        unit: UnitId,
        from: String,
        into: String,
    },
}

impl LifecycleEvent {
    /// Lifecycle counterpart of a manager notice. Battle requests have none;
    /// the session answers them with [`BattleEvent`]s instead.
    pub fn from_notice(notice: &EventNotice) -> Option<Self> {
        match notice {
            EventNotice::Started { unit, event } => Some(Self::Started {
                unit: *unit,
                event: event.clone(),
            }),
            EventNotice::Finished {
                unit,
                event,
                success,
            } => Some(Self::Finished {
                unit: *unit,
                event: event.clone(),
                success: *success,
            }),
            EventNotice::Transformed { unit, from, into } => Some(Self::Transformed {
                unit: *unit,
                from: from.clone(),
                into: into.clone(),
            }),
            EventNotice::BattleRequested { .. } => None,
        }
    }
}

/// Battles started on behalf of encounter events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleEvent {
    Started {
        player: UnitId,
        enemy: String,
    },
    Completed {
        player: UnitId,
        enemy: String,
        won: bool,
        reward: i32,
        /// Memoria spent when the enemy fell to an Arte.
        arte_cost: Option<i32>,
        turns: u32,
    },
    /// The battle could not start; the event is told it was lost.
    Rejected {
        player: UnitId,
        enemy: String,
        reason: String,
    },
}

impl From<&BattleOutcome> for BattleEvent {
    fn from(outcome: &BattleOutcome) -> Self {
        Self::Completed {
            player: outcome.player,
            enemy: outcome.enemy.name.clone(),
            won: outcome.won,
            reward: outcome.reward,
            arte_cost: outcome.arte_cost,
            turns: outcome.turns,
        }
    }
}

/// What the presentation sink was asked to show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PresentationEvent {
    Message {
        text: String,
        color: String,
    },
    Health {
        current: i32,
        max: i32,
    },
    Memoria {
        current: i32,
        total: i32,
        is_gain: bool,
    },
}
