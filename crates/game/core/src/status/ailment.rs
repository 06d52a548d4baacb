use bitflags::bitflags;

use crate::state::UnitRecord;
use crate::stats::StatModifier;

bitflags! {
    /// Behavioral switches an ailment puts on its carrier.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct AilmentFlags: u8 {
        /// The carrier cannot act on its turn.
        const BLOCKS_ACTIONS = 1 << 0;
        /// Incoming damage is doubled.
        const VULNERABLE     = 1 << 1;
        /// Resistances count as zero.
        const NO_RESISTANCE  = 1 << 2;
    }
}

/// One-shot effect fired by an ailment hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AilmentEffect {
    Damage(i32),
    Heal(i32),
    RecoverStance(i32),
    ResetStance,
}

impl AilmentEffect {
    pub fn apply(self, unit: &mut UnitRecord) {
        match self {
            AilmentEffect::Damage(amount) => {
                unit.take_damage(amount);
            }
            AilmentEffect::Heal(amount) => {
                unit.heal(amount);
            }
            AilmentEffect::RecoverStance(amount) => unit.recover_stance(amount),
            AilmentEffect::ResetStance => unit.reset_stance(),
        }
    }
}

/// Immutable ailment template.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Ailment {
    pub name: String,
    /// Number of the carrier's turns the effect lasts after its apply pass.
    pub duration: i32,
    pub permanent: bool,
    pub damage_per_tick: i32,
    pub modifiers: Vec<StatModifier>,
    pub flags: AilmentFlags,
    pub on_apply: Vec<AilmentEffect>,
    pub on_tick: Vec<AilmentEffect>,
    pub on_remove: Vec<AilmentEffect>,
}

impl Ailment {
    pub fn new(name: impl Into<String>, duration: i32) -> Self {
        Self {
            name: name.into(),
            duration,
            ..Self::default()
        }
    }

    /// The stance-break ailment: the carrier loses its next turn, takes
    /// double damage until then and gets its stance back when it wears off.
    pub fn staggered(name: impl Into<String>) -> Self {
        Self {
            flags: AilmentFlags::all(),
            on_remove: vec![AilmentEffect::ResetStance],
            ..Self::new(name, 1)
        }
    }

    pub fn with_flags(mut self, flags: AilmentFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_modifier(mut self, modifier: StatModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_damage_per_tick(mut self, damage: i32) -> Self {
        self.damage_per_tick = damage;
        self
    }

    pub fn permanent(mut self) -> Self {
        self.permanent = true;
        self
    }
}

impl Default for Ailment {
    fn default() -> Self {
        Self {
            name: String::new(),
            duration: 1,
            permanent: false,
            damage_per_tick: 0,
            modifiers: Vec::new(),
            flags: AilmentFlags::empty(),
            on_apply: Vec::new(),
            on_tick: Vec::new(),
            on_remove: Vec::new(),
        }
    }
}
