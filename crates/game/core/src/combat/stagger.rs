use tracing::{debug, error, warn};

use crate::battle::BattleError;
use crate::config::GameConfig;
use crate::registry::Registry;
use crate::state::UnitRecord;
use crate::status::AilmentFlags;

/// Whether the unit carries the configured stagger ailment.
pub fn is_staggered(unit: &UnitRecord, config: &GameConfig) -> bool {
    unit.has_status(&config.stagger_effect)
}

/// Whether an ailment or a registered manifestation keeps the unit from acting.
pub fn is_action_blocked(unit: &UnitRecord) -> bool {
    unit.status_flags().contains(AilmentFlags::BLOCKS_ACTIONS) || unit.skips_turn()
}

/// Applies the stagger ailment after a stance break.
///
/// # Errors
///
/// - [`BattleError::UnitDefeated`] when the unit is already down
/// - [`BattleError::MissingStaggerEffect`] when the registry lacks the ailment;
///   the unit stays unstaggered
pub fn break_stance(
    unit: &mut UnitRecord,
    registry: &Registry,
    config: &GameConfig,
) -> Result<(), BattleError> {
    if !unit.is_alive() {
        warn!(unit = %unit.id, "cannot stagger a defeated unit");
        return Err(BattleError::UnitDefeated(unit.id));
    }

    let Some(stagger) = registry.ailment(&config.stagger_effect) else {
        error!(unit = %unit.id, effect = %config.stagger_effect, "stagger effect missing from registry");
        return Err(BattleError::MissingStaggerEffect(config.stagger_effect.clone()));
    };

    if !unit.add_status_effect(stagger) {
        return Err(BattleError::StaggerRejected(unit.id));
    }
    debug!(unit = %unit.id, "stance broken, unit staggered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::basic_attack;
    use crate::state::UnitId;
    use crate::stats::Attributes;

    #[test]
    fn stance_break_applies_exactly_one_stagger() {
        let config = GameConfig::default();
        let registry = Registry::with_stagger(&config.stagger_effect);
        let attacker = UnitRecord::new(UnitId(1), "attacker", Attributes::uniform(1), 50);
        let mut defender = UnitRecord::new(UnitId(2), "defender", Attributes::uniform(1), 500);
        let stance = defender.stance().max();

        let mut breaks = 0;
        for _ in 0..stance + 3 {
            let report = basic_attack(&attacker, &mut defender, &registry, &config);
            if report.is_some_and(|r| r.stance_broken) {
                breaks += 1;
            }
        }

        assert_eq!(breaks, 1);
        assert!(is_staggered(&defender, &config));
        assert_eq!(defender.statuses().len(), 1);
        assert!(is_action_blocked(&defender));
    }

    #[test]
    fn missing_registry_entry_leaves_unit_unstaggered() {
        let config = GameConfig::default();
        let mut unit = UnitRecord::new(UnitId(3), "lonely", Attributes::uniform(1), 20);
        unit.reduce_stance(10);

        let result = break_stance(&mut unit, &Registry::new(), &config);
        assert_eq!(
            result,
            Err(BattleError::MissingStaggerEffect("Staggered".to_owned()))
        );
        assert!(!is_staggered(&unit, &config));
    }
}
