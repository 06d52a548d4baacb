//! One side's turn.

use tracing::debug;

use crate::combat::{AttackReport, basic_attack, is_action_blocked, is_staggered};
use crate::config::GameConfig;
use crate::registry::Registry;
use crate::state::UnitRecord;

/// What happened during one turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TurnReport {
    pub attack: Option<AttackReport>,
    /// The actor could not act (staggered, skipping or defeated).
    pub skipped: bool,
}

/// Runs `actor`'s turn against `opponent`.
///
/// Order: tick ailments, start-of-turn manifestations, stance recovery
/// (not while staggered), basic attack (unless actions are blocked),
/// end-of-turn manifestations, symptom durations. A phase that defeats
/// either side ends the turn there.
pub fn take_turn(
    actor: &mut UnitRecord,
    opponent: &mut UnitRecord,
    registry: &Registry,
    config: &GameConfig,
) -> TurnReport {
    let mut report = TurnReport::default();

    actor.tick_status_effects();
    if !actor.is_alive() {
        report.skipped = true;
        return report;
    }

    actor.run_start_of_turn_manifestations();
    if !actor.is_alive() {
        report.skipped = true;
        return report;
    }

    if !is_staggered(actor, config) {
        actor.recover_stance(config.stance_recovery);
    }

    if is_action_blocked(actor) {
        debug!(unit = %actor.id, "unit cannot act this turn");
        report.skipped = true;
    } else {
        report.attack = basic_attack(actor, opponent, registry, config);
    }

    if opponent.is_alive() {
        actor.run_end_of_turn_manifestations();
        let expired = actor.update_symptom_durations();
        if !expired.is_empty() {
            debug!(unit = %actor.id, ?expired, "symptoms expired");
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::UnitId;
    use crate::stats::{Attribute, Attributes};

    fn fighter(id: u32, aggressiveness: i32, fortitude: i32, health: i32) -> UnitRecord {
        let mut attributes = Attributes::uniform(1);
        attributes.set(Attribute::Aggressiveness, aggressiveness);
        attributes.set(Attribute::Fortitude, fortitude);
        UnitRecord::new(UnitId(id), format!("unit{id}"), attributes, health)
    }

    #[test]
    fn staggered_unit_skips_exactly_one_own_turn() {
        let config = GameConfig::default();
        let registry = Registry::with_stagger(&config.stagger_effect);
        let mut player = fighter(0, 5, 2, 200);
        let mut enemy = fighter(1, 5, 2, 200);

        enemy.reduce_stance(enemy.stance().max() - 1);
        let report = take_turn(&mut player, &mut enemy, &registry, &config);
        assert!(report.attack.is_some_and(|a| a.stance_broken));
        assert!(is_staggered(&enemy, &config));

        let skipped = take_turn(&mut enemy, &mut player, &registry, &config);
        assert!(skipped.skipped);
        assert_eq!(player.health().current(), 200);

        take_turn(&mut player, &mut enemy, &registry, &config);
        let acted = take_turn(&mut enemy, &mut player, &registry, &config);
        assert!(!acted.skipped);
        assert!(!is_staggered(&enemy, &config));
        assert_eq!(enemy.stance().current(), enemy.stance().max());
    }
}
