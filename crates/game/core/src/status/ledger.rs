use std::sync::Arc;

use arrayvec::ArrayVec;
use tracing::{debug, warn};

use super::{Ailment, AilmentFlags};
use crate::config::GameConfig;
use crate::state::UnitRecord;

/// A live ailment on a unit.
#[derive(Clone, Debug)]
pub struct StatusEffect {
    pub ailment: Arc<Ailment>,
    pub remaining: i32,
    /// `false` until the first tick after application.
    pub has_applied: bool,
}

impl StatusEffect {
    fn new(ailment: Arc<Ailment>) -> Self {
        Self {
            remaining: ailment.duration,
            ailment,
            has_applied: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.ailment.name
    }
}

/// Active status effects of one unit, at most one per ailment name.
#[derive(Clone, Debug, Default)]
pub struct StatusLedger {
    effects: ArrayVec<StatusEffect, { GameConfig::MAX_STATUS_EFFECTS }>,
}

impl StatusLedger {
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&StatusEffect> {
        self.effects.iter().find(|effect| effect.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Union of the flags of every active effect.
    pub fn flags(&self) -> AilmentFlags {
        self.effects
            .iter()
            .fold(AilmentFlags::empty(), |acc, effect| acc | effect.ailment.flags)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.effects.iter().position(|effect| effect.name() == name)
    }
}

impl UnitRecord {
    pub fn statuses(&self) -> &StatusLedger {
        &self.statuses
    }

    pub fn has_status(&self, name: &str) -> bool {
        self.statuses.contains(name)
    }

    pub fn status_flags(&self) -> AilmentFlags {
        self.statuses.flags()
    }

    /// Applies an ailment.
    ///
    /// Re-applying an active ailment refreshes its duration. A new effect
    /// applies its stat modifiers and fires its apply hooks immediately.
    /// Returns `false` when nothing changed.
    pub fn add_status_effect(&mut self, ailment: Arc<Ailment>) -> bool {
        if !self.is_alive() {
            warn!(unit = %self.id, ailment = %ailment.name, "ignoring ailment on a defeated unit");
            return false;
        }

        if let Some(index) = self.statuses.position(&ailment.name) {
            let effect = &mut self.statuses.effects[index];
            effect.remaining = effect.ailment.duration;
            debug!(unit = %self.id, ailment = %ailment.name, "refreshed status effect");
            return true;
        }

        if self.statuses.effects.is_full() {
            warn!(unit = %self.id, ailment = %ailment.name, "status effect ledger is full");
            return false;
        }

        for modifier in &ailment.modifiers {
            self.apply_modifier(*modifier);
        }
        for effect in &ailment.on_apply {
            effect.apply(self);
        }

        debug!(unit = %self.id, ailment = %ailment.name, "applied status effect");
        self.statuses.effects.push(StatusEffect::new(ailment));
        true
    }

    /// Removes an ailment, reversing its modifiers and firing its remove hooks.
    pub fn remove_status_effect(&mut self, name: &str) -> bool {
        let Some(index) = self.statuses.position(name) else {
            return false;
        };
        let effect = self.statuses.effects.remove(index);
        let ailment = effect.ailment;

        for modifier in &ailment.modifiers {
            self.apply_modifier(modifier.reversed());
        }
        for hook in &ailment.on_remove {
            hook.apply(self);
        }

        debug!(unit = %self.id, ailment = %ailment.name, "removed status effect");
        true
    }

    /// Advances every effect by one of this unit's turns.
    pub fn tick_status_effects(&mut self) {
        let mut expired = Vec::new();

        for index in 0..self.statuses.effects.len() {
            let effect = &mut self.statuses.effects[index];
            if !effect.has_applied {
                effect.has_applied = true;
                continue;
            }

            let ailment = Arc::clone(&effect.ailment);
            if !ailment.permanent {
                effect.remaining -= 1;
                if effect.remaining <= 0 {
                    expired.push(ailment.name.clone());
                }
            }
            self.take_damage(ailment.damage_per_tick);
            for hook in &ailment.on_tick {
                hook.apply(self);
            }
        }

        for name in expired {
            self.remove_status_effect(&name);
        }
    }

    pub fn clear_status_effects(&mut self) {
        let names: Vec<String> = self.statuses.iter().map(|e| e.name().to_owned()).collect();
        for name in names {
            self.remove_status_effect(&name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::UnitId;
    use crate::stats::{Attribute, Attributes, StatModifier};
    use crate::status::AilmentEffect;

    fn unit() -> UnitRecord {
        UnitRecord::new(UnitId(1), "Tester", Attributes::uniform(4), 50)
    }

    #[test]
    fn reapplying_refreshes_instead_of_stacking() {
        let mut unit = unit();
        let poison = Arc::new(Ailment::new("Poisoned", 3).with_damage_per_tick(2));

        assert!(unit.add_status_effect(Arc::clone(&poison)));
        unit.tick_status_effects();
        unit.tick_status_effects();
        assert_eq!(unit.statuses().get("Poisoned").map(|e| e.remaining), Some(2));

        assert!(unit.add_status_effect(poison));
        assert_eq!(unit.statuses().len(), 1);
        assert_eq!(unit.statuses().get("Poisoned").map(|e| e.remaining), Some(3));
    }

    #[test]
    fn first_tick_only_marks_applied() {
        let mut unit = unit();
        unit.add_status_effect(Arc::new(Ailment::new("Burning", 2).with_damage_per_tick(5)));

        unit.tick_status_effects();
        assert_eq!(unit.health().current(), 50);

        unit.tick_status_effects();
        assert_eq!(unit.health().current(), 45);
        unit.tick_status_effects();
        assert_eq!(unit.health().current(), 40);
        assert!(!unit.has_status("Burning"));
    }

    #[test]
    fn permanent_effects_never_expire() {
        let mut unit = unit();
        let blessing = Ailment {
            on_tick: vec![AilmentEffect::Heal(1)],
            ..Ailment::new("Blessed", 1).permanent()
        };
        unit.add_status_effect(Arc::new(blessing));
        unit.take_damage(10);

        for _ in 0..5 {
            unit.tick_status_effects();
        }
        assert!(unit.has_status("Blessed"));
        assert_eq!(unit.health().current(), 44);
    }

    #[test]
    fn modifier_round_trip_restores_attributes() {
        let mut unit = unit();
        let before = *unit.attributes();
        let weakened = Ailment::new("Weakened", 2)
            .with_modifier(StatModifier::new(Attribute::Aggressiveness, -3))
            .with_modifier(StatModifier::new(Attribute::Fortitude, 2));

        unit.add_status_effect(Arc::new(weakened));
        assert_eq!(unit.attribute(Attribute::Aggressiveness), 1);
        assert_eq!(unit.attribute(Attribute::Fortitude), 6);

        unit.remove_status_effect("Weakened");
        assert_eq!(*unit.attributes(), before);
    }

    #[test]
    fn dead_units_ignore_new_ailments() {
        let mut unit = unit();
        unit.take_damage(50);
        assert!(!unit.add_status_effect(Arc::new(Ailment::new("Poisoned", 3))));
        assert!(unit.statuses().is_empty());
    }

    #[test]
    fn stagger_expires_after_one_owner_turn_and_resets_stance() {
        let mut unit = unit();
        unit.reduce_stance(100);
        unit.add_status_effect(Arc::new(Ailment::staggered("Staggered")));
        assert!(unit.status_flags().contains(AilmentFlags::BLOCKS_ACTIONS));

        unit.tick_status_effects();
        assert!(unit.has_status("Staggered"));
        assert_eq!(unit.stance().current(), 0);

        unit.tick_status_effects();
        assert!(!unit.has_status("Staggered"));
        assert_eq!(unit.stance().current(), unit.stance().max());
    }
}
