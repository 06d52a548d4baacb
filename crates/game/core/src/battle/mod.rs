//! Turn-based battle between the player and one enemy.
//!
//! A [`BattleSystem`] runs at most one battle at a time. The player record
//! stays with the caller and is lent to every call; the enemy is owned by
//! the battle until it concludes.
//!
//! Phases advance either one at a time through [`BattleSystem::step`],
//! paced by [`BattleSystem::tick`], or all at once with
//! [`BattleSystem::resolve`].

mod error;
mod turn;

pub use error::BattleError;
pub use turn::{TurnReport, take_turn};

use std::sync::Arc;

use strum::{AsRefStr, Display};
use tracing::{debug, warn};

use crate::config::GameConfig;
use crate::env::GameEnv;
use crate::registry::Registry;
use crate::state::{UnitId, UnitRecord};

/// Phase of the battle state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum BattleState {
    Start,
    PlayerTurn,
    EnemyTurn,
    Won,
    Lost,
}

impl BattleState {
    pub fn is_over(self) -> bool {
        matches!(self, BattleState::Won | BattleState::Lost)
    }
}

/// Result of a concluded battle.
#[derive(Clone, Debug)]
pub struct BattleOutcome {
    pub player: UnitId,
    /// Final record of the enemy.
    pub enemy: UnitRecord,
    pub won: bool,
    /// Memoria paid to the player.
    pub reward: i32,
    /// Memoria spent on an instant Arte kill.
    pub arte_cost: Option<i32>,
    /// Turns taken by both sides.
    pub turns: u32,
}

#[derive(Debug)]
struct Battle {
    player: UnitId,
    enemy: UnitRecord,
    state: BattleState,
    turns: u32,
    timer: f32,
}

/// Drives a single battle at a time.
#[derive(Debug)]
pub struct BattleSystem {
    config: GameConfig,
    registry: Arc<Registry>,
    current: Option<Battle>,
}

impl BattleSystem {
    /// Turns after which a battle is called off as lost.
    pub const MAX_TURNS: u32 = 1_000;

    pub fn new(config: GameConfig, registry: Arc<Registry>) -> Self {
        Self {
            config,
            registry,
            current: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn state(&self) -> Option<BattleState> {
        self.current.as_ref().map(|battle| battle.state)
    }

    pub fn enemy(&self) -> Option<&UnitRecord> {
        self.current.as_ref().map(|battle| &battle.enemy)
    }

    /// Player of the running battle.
    pub fn player(&self) -> Option<UnitId> {
        self.current.as_ref().map(|battle| battle.player)
    }

    /// Starts a battle of `player` against `enemy`.
    ///
    /// When the player's current memoria covers the enemy's current health,
    /// the enemy falls to an Arte costing that much memoria and the concluded
    /// outcome comes back right away.
    ///
    /// # Errors
    ///
    /// - [`BattleError::BattleInProgress`] while another battle runs
    /// - [`BattleError::UnitDefeated`] when either side is already down
    /// - [`BattleError::SameUnit`] when both sides are the same unit
    pub fn start_battle(
        &mut self,
        player: &mut UnitRecord,
        mut enemy: UnitRecord,
        env: GameEnv<'_>,
    ) -> Result<Option<BattleOutcome>, BattleError> {
        if self.current.is_some() {
            warn!(player = %player.id, enemy = %enemy.id, "battle already in progress");
            return Err(BattleError::BattleInProgress);
        }
        if player.id == enemy.id {
            return Err(BattleError::SameUnit(player.id));
        }
        for unit in [&*player, &enemy] {
            if !unit.is_alive() {
                warn!(unit = %unit.id, "defeated unit cannot enter battle");
                return Err(BattleError::UnitDefeated(unit.id));
            }
        }

        let enemy_health = enemy.health().current();
        if player.memoria().current() >= enemy_health {
            enemy.take_damage(enemy_health);
            let cost = player.lose_memoria(enemy_health);
            debug!(player = %player.id, enemy = %enemy.id, cost, "enemy felled by arte");
            let battle = Battle {
                player: player.id,
                enemy,
                state: BattleState::Won,
                turns: 0,
                timer: 0.0,
            };
            return Ok(Some(self.conclude(player, battle, Some(cost), env)));
        }

        debug!(player = %player.id, enemy = %enemy.id, "battle started");
        self.current = Some(Battle {
            player: player.id,
            enemy,
            state: BattleState::Start,
            turns: 0,
            timer: 0.0,
        });
        Ok(None)
    }

    /// Advances the battle by one phase.
    ///
    /// Returns the outcome once a side is defeated.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::NoActiveBattle`] without a running battle.
    pub fn step(
        &mut self,
        player: &mut UnitRecord,
        env: GameEnv<'_>,
    ) -> Result<Option<BattleOutcome>, BattleError> {
        let Some(battle) = self.current.as_mut() else {
            return Err(BattleError::NoActiveBattle);
        };
        if battle.player != player.id {
            warn!(player = %player.id, expected = %battle.player, "wrong player for battle");
            return Err(BattleError::NotInBattle(player.id));
        }

        battle.state = match battle.state {
            BattleState::Start => BattleState::PlayerTurn,
            BattleState::PlayerTurn => {
                take_turn(player, &mut battle.enemy, &self.registry, &self.config);
                battle.turns += 1;
                Self::settle(player, battle, BattleState::EnemyTurn)
            }
            BattleState::EnemyTurn => {
                take_turn(&mut battle.enemy, player, &self.registry, &self.config);
                battle.turns += 1;
                Self::settle(player, battle, BattleState::PlayerTurn)
            }
            over => over,
        };

        if battle.turns >= Self::MAX_TURNS && !battle.state.is_over() {
            warn!(player = %player.id, turns = battle.turns, "battle stalled, calling it lost");
            battle.state = BattleState::Lost;
        }
        debug!(player = %player.id, state = %battle.state, turn = battle.turns, "battle phase");

        if !battle.state.is_over() {
            return Ok(None);
        }
        let Some(battle) = self.current.take() else {
            return Err(BattleError::NoActiveBattle);
        };
        Ok(Some(self.conclude(player, battle, None, env)))
    }

    fn settle(player: &UnitRecord, battle: &Battle, next: BattleState) -> BattleState {
        if !battle.enemy.is_alive() {
            BattleState::Won
        } else if !player.is_alive() {
            BattleState::Lost
        } else {
            next
        }
    }

    /// Advances the pacing timer and runs every phase that came due.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::NoActiveBattle`] without a running battle.
    pub fn tick(
        &mut self,
        dt: f32,
        player: &mut UnitRecord,
        env: GameEnv<'_>,
    ) -> Result<Option<BattleOutcome>, BattleError> {
        let delay = self.config.phase_delay.max(0.0);
        let Some(battle) = self.current.as_mut() else {
            return Err(BattleError::NoActiveBattle);
        };
        battle.timer += dt;

        loop {
            let Some(battle) = self.current.as_mut() else {
                return Ok(None);
            };
            if battle.timer < delay {
                return Ok(None);
            }
            battle.timer -= delay;
            if let Some(outcome) = self.step(player, env)? {
                return Ok(Some(outcome));
            }
        }
    }

    /// Runs the battle to its end without pacing.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::NoActiveBattle`] without a running battle.
    pub fn resolve(
        &mut self,
        player: &mut UnitRecord,
        env: GameEnv<'_>,
    ) -> Result<BattleOutcome, BattleError> {
        loop {
            if let Some(outcome) = self.step(player, env)? {
                return Ok(outcome);
            }
        }
    }

    fn conclude(
        &mut self,
        player: &mut UnitRecord,
        battle: Battle,
        arte_cost: Option<i32>,
        env: GameEnv<'_>,
    ) -> BattleOutcome {
        let won = battle.state == BattleState::Won;
        let reward = if won {
            battle.enemy.memoria_loot.max(0) + battle.enemy.memoria().current()
        } else {
            0
        };
        if reward > 0 {
            player.gain_memoria(reward);
        }
        player.clear_status_effects();

        if let Ok(sink) = env.presentation() {
            let health = player.health();
            let memoria = player.memoria();
            sink.update_health_display(health.current(), health.max());
            sink.update_memoria_display(memoria.current(), memoria.total(), reward > 0);
        }

        debug!(
            player = %player.id,
            enemy = %battle.enemy.id,
            won,
            reward,
            turns = battle.turns,
            "battle complete"
        );
        self.current = None;

        BattleOutcome {
            player: battle.player,
            enemy: battle.enemy,
            won,
            reward,
            arte_cost,
            turns: battle.turns,
        }
    }
}
