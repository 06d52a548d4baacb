use behavior_tree::{Behavior, Status};
use strum::{AsRefStr, Display, EnumString};
use tracing::{debug, error};

use crate::event::context::keys;
use crate::event::step::{Await, Directive, StepContext};

/// Enemy that can be met in an encounter room, `rate` more times.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterEntry {
    pub enemy: String,
    pub rate: u32,
}

impl EncounterEntry {
    pub fn new(enemy: impl Into<String>, rate: u32) -> Self {
        Self {
            enemy: enemy.into(),
            rate,
        }
    }
}

/// How an enemy is taken from the pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EncounterSelection {
    /// Uniformly among the candidates.
    #[default]
    Random,
    /// The first candidate in list order.
    Sequential,
}

/// Live enemy pool of one encounter room.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncounterState {
    pub pool: Vec<EncounterEntry>,
    /// Enemy of the battle in progress, when it came from the pool.
    pub pending: Option<String>,
}

/// Picks an enemy, builds it through the enemy factory and starts a battle.
///
/// Regular pool entries with a positive rate come first; once they are used
/// up the challengers are drawn. No candidate at all turns the room into the
/// fallback event.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StartEncounter {
    pub slot: String,
    pub pool: Vec<EncounterEntry>,
    pub challengers: Vec<String>,
    pub selection: EncounterSelection,
    pub level: Option<u32>,
    pub fallback: Option<String>,
}

impl Default for StartEncounter {
    fn default() -> Self {
        Self {
            slot: "encounter".to_owned(),
            pool: Vec::new(),
            challengers: Vec::new(),
            selection: EncounterSelection::Random,
            level: None,
            fallback: None,
        }
    }
}

impl StartEncounter {
    pub fn new(pool: Vec<EncounterEntry>) -> Self {
        Self {
            pool,
            ..Self::default()
        }
    }

    fn pick(&self, ctx: &mut StepContext<'_>, candidates: &[String]) -> Option<String> {
        match self.selection {
            EncounterSelection::Sequential => candidates.first().cloned(),
            EncounterSelection::Random => {
                let bound = u32::try_from(candidates.len()).unwrap_or(u32::MAX);
                match ctx.roll_below(bound) {
                    Ok(roll) => candidates.get(roll as usize).cloned(),
                    Err(err) => {
                        error!(unit = %ctx.unit.id, error = %err, "cannot roll encounter");
                        None
                    }
                }
            }
        }
    }

    fn give_up(&self, ctx: &mut StepContext<'_>) -> Status {
        let into = ctx.fallback_event(self.fallback.as_deref());
        ctx.direct(Directive::Transform {
            into,
            restart: true,
        });
        Status::Failure
    }
}

impl Behavior<StepContext<'_>> for StartEncounter {
    fn tick(&self, ctx: &mut StepContext<'_>) -> Status {
        let regular: Vec<String> = {
            let state = ctx
                .state
                .encounters
                .entry(self.slot.clone())
                .or_insert_with(|| EncounterState {
                    pool: self.pool.clone(),
                    pending: None,
                });
            state.pending = None;
            state
                .pool
                .iter()
                .filter(|entry| entry.rate > 0)
                .map(|entry| entry.enemy.clone())
                .collect()
        };

        let from_pool = !regular.is_empty();
        let candidates = if from_pool {
            regular
        } else {
            self.challengers.clone()
        };
        if candidates.is_empty() {
            error!(unit = %ctx.unit.id, slot = %self.slot, "encounter has no enemies");
            return self.give_up(ctx);
        }

        let Some(name) = self.pick(ctx, &candidates) else {
            return self.give_up(ctx);
        };

        let enemy = match ctx
            .env
            .enemies()
            .and_then(|factory| factory.create_enemy(&name, self.level))
        {
            Ok(enemy) => enemy,
            Err(err) => {
                error!(unit = %ctx.unit.id, enemy = %name, error = %err, "cannot build enemy");
                return self.give_up(ctx);
            }
        };

        if from_pool && let Some(state) = ctx.state.encounters.get_mut(&self.slot) {
            state.pending = Some(name.clone());
        }

        debug!(unit = %ctx.unit.id, enemy = %name, from_pool, "encounter started");
        ctx.publish(keys::ENEMY_NAME, name);
        ctx.publish(keys::BATTLE_WON, false);
        ctx.direct(Directive::StartBattle {
            enemy: Box::new(enemy),
        });
        ctx.await_signal(Await::Battle);
        Status::Running
    }

    fn is_blocking(&self) -> bool {
        true
    }
}

/// Settles the battle of a [`StartEncounter`]. Fails when it was lost.
///
/// A won battle against a pool enemy lowers its rate; an enemy at rate zero
/// leaves the pool.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResolveEncounter {
    pub slot: String,
}

impl Default for ResolveEncounter {
    fn default() -> Self {
        Self {
            slot: "encounter".to_owned(),
        }
    }
}

impl Behavior<StepContext<'_>> for ResolveEncounter {
    fn tick(&self, ctx: &mut StepContext<'_>) -> Status {
        let won = ctx.lookup_as(keys::BATTLE_WON, false);
        let unit = ctx.unit.id;

        let Some(state) = ctx.state.encounters.get_mut(&self.slot) else {
            return Status::from_bool(won);
        };
        let pending = state.pending.take();
        if !won {
            debug!(unit = %unit, "encounter lost");
            return Status::Failure;
        }

        if let Some(name) = pending
            && let Some(index) = state
                .pool
                .iter()
                .position(|entry| entry.enemy == name && entry.rate > 0)
        {
            state.pool[index].rate -= 1;
            if state.pool[index].rate == 0 {
                state.pool.remove(index);
            }
            debug!(unit = %unit, enemy = %name, "encounter rate lowered");
        }
        Status::Success
    }

    fn is_blocking(&self) -> bool {
        true
    }
}
