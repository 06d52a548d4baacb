use tracing::debug;

use crate::state::{UnitId, UnitRecord};
use crate::stats::{Attribute, StatModifier};

/// What a symptom does to its carrier when one of its lists fires.
///
/// Amounts scale with the number of stacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Manifestation {
    /// Carrier cannot act while this is registered.
    SkipTurn,
    Damage { amount: i32 },
    Heal { amount: i32 },
    RecoverStance { amount: i32 },
    ResetStance,
    Modify { attribute: Attribute, amount: i32 },
}

impl Manifestation {
    pub fn execute(&self, unit: &mut UnitRecord, stacks: u32) {
        let stacks = stacks.max(1) as i32;
        match *self {
            Manifestation::SkipTurn => {}
            Manifestation::Damage { amount } => {
                unit.take_damage(amount.saturating_mul(stacks));
            }
            Manifestation::Heal { amount } => {
                unit.heal(amount.saturating_mul(stacks));
            }
            Manifestation::RecoverStance { amount } => {
                unit.recover_stance(amount.saturating_mul(stacks))
            }
            Manifestation::ResetStance => unit.reset_stance(),
            Manifestation::Modify { attribute, amount } => {
                unit.apply_modifier(StatModifier::new(attribute, amount.saturating_mul(stacks)))
            }
        }
    }

    /// Undoes a persistent manifestation that fired once on apply. Only
    /// attribute changes are reverted; health and stance effects stay.
    pub fn revert(&self, unit: &mut UnitRecord) {
        if let Manifestation::Modify { attribute, amount } = *self {
            unit.apply_modifier(StatModifier::new(attribute, amount).reversed());
        }
    }

    pub(crate) fn on_register(&self, unit: UnitId, source: &str) {
        debug!(%unit, source, manifestation = ?self, "manifestation registered");
    }

    pub(crate) fn on_unregister(&self, unit: UnitId, source: &str) {
        debug!(%unit, source, manifestation = ?self, "manifestation unregistered");
    }
}

/// The three manifestation lists of a symptom.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ManifestationSet {
    pub start_of_turn: Vec<Manifestation>,
    pub persistent: Vec<Manifestation>,
    pub end_of_turn: Vec<Manifestation>,
}

impl ManifestationSet {
    pub fn is_empty(&self) -> bool {
        self.start_of_turn.is_empty() && self.persistent.is_empty() && self.end_of_turn.is_empty()
    }

    pub fn start(mut self, manifestation: Manifestation) -> Self {
        self.start_of_turn.push(manifestation);
        self
    }

    pub fn persistent(mut self, manifestation: Manifestation) -> Self {
        self.persistent.push(manifestation);
        self
    }

    pub fn end(mut self, manifestation: Manifestation) -> Self {
        self.end_of_turn.push(manifestation);
        self
    }
}
