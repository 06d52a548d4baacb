use tracing::{debug, error};

use super::stagger::{break_stance, is_staggered};
use crate::config::GameConfig;
use crate::registry::Registry;
use crate::state::UnitRecord;
use crate::stats::{Attribute, Attributes};
use crate::status::AilmentFlags;

/// Summary of one basic attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackReport {
    /// Damage after the vulnerability multiplier, before clamping to health.
    pub damage: i32,
    /// Health the defender actually lost.
    pub dealt: i32,
    pub vulnerable: bool,
    pub stance_broken: bool,
    pub defeated: bool,
}

/// Damage of a basic attack before vulnerability.
pub fn calculate_damage(attacker: &Attributes, defender: &Attributes, base_attack: i32) -> i32 {
    (base_attack + attacker.get(Attribute::Aggressiveness) - defender.get(Attribute::Fortitude))
        .max(0)
}

/// Resolves a basic attack of `attacker` against `defender`.
///
/// Returns `None` when the defender is already defeated.
pub fn basic_attack(
    attacker: &UnitRecord,
    defender: &mut UnitRecord,
    registry: &Registry,
    config: &GameConfig,
) -> Option<AttackReport> {
    if !defender.is_alive() {
        debug!(attacker = %attacker.id, defender = %defender.id, "attack on a defeated unit ignored");
        return None;
    }

    let vulnerable = defender.status_flags().contains(AilmentFlags::VULNERABLE);
    let mut damage = calculate_damage(attacker.attributes(), defender.attributes(), config.base_attack);
    if vulnerable {
        damage *= GameConfig::VULNERABLE_DAMAGE_MULTIPLIER;
    }

    let dealt = defender.take_damage(damage);
    defender.reduce_stance(1);
    let defeated = !defender.is_alive();

    let mut stance_broken = false;
    if !defeated && defender.stance().is_broken() && !is_staggered(defender, config) {
        match break_stance(defender, registry, config) {
            Ok(()) => stance_broken = true,
            Err(err) => error!(unit = %defender.id, error = %err, "stance broke without stagger"),
        }
    }

    debug!(
        attacker = %attacker.id,
        defender = %defender.id,
        damage,
        dealt,
        vulnerable,
        stance = defender.stance().current(),
        "basic attack"
    );

    Some(AttackReport {
        damage,
        dealt,
        vulnerable,
        stance_broken,
        defeated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::UnitId;

    fn fighter(id: u32, aggressiveness: i32, fortitude: i32) -> UnitRecord {
        let attributes = Attributes {
            aggressiveness,
            fortitude,
            ..Attributes::default()
        };
        UnitRecord::new(UnitId(id), format!("fighter-{id}"), attributes, 100)
    }

    #[test]
    fn damage_never_goes_negative() {
        let weak = fighter(1, 0, 0);
        let tank = fighter(2, 0, 50);
        assert_eq!(calculate_damage(weak.attributes(), tank.attributes(), 5), 0);
    }

    #[test]
    fn base_damage_and_staggered_damage() {
        let config = GameConfig::default();
        let registry = Registry::with_stagger(&config.stagger_effect);
        let player = fighter(1, 5, 0);
        let mut enemy = fighter(2, 0, 2);

        let report = basic_attack(&player, &mut enemy, &registry, &config);
        assert_eq!(report.map(|r| r.damage), Some(8));

        enemy.reduce_stance(100);
        super::break_stance(&mut enemy, &registry, &config).ok();
        let report = basic_attack(&player, &mut enemy, &registry, &config);
        assert_eq!(report.map(|r| r.damage), Some(16));
    }

    #[test]
    fn defeated_defender_is_not_attacked() {
        let config = GameConfig::default();
        let registry = Registry::new();
        let player = fighter(1, 5, 0);
        let mut enemy = fighter(2, 0, 0);
        enemy.take_damage(100);

        assert!(basic_attack(&player, &mut enemy, &registry, &config).is_none());
    }
}
