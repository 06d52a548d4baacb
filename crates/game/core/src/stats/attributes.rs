//! The eight named attributes every unit carries.

/// Attribute identifiers.
///
/// - **Resolve**: steadiness under pressure
/// - **Awareness**: perception of the surroundings
/// - **Fortitude**: physical toughness, subtracts from incoming attacks
/// - **Willpower**: mental toughness
/// - **Aggressiveness**: attack power, adds to outgoing attacks
/// - **Influence**: force of presence
/// - **Synapsis**: reaction and coordination
/// - **Kismet**: luck
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Attribute {
    Resolve,
    Awareness,
    Fortitude,
    Willpower,
    Aggressiveness,
    Influence,
    Synapsis,
    Kismet,
}

/// Flat change to one attribute, applied while a status effect is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatModifier {
    pub attribute: Attribute,
    pub amount: i32,
}

impl StatModifier {
    pub const fn new(attribute: Attribute, amount: i32) -> Self {
        Self { attribute, amount }
    }

    /// The modifier that undoes this one.
    pub const fn reversed(self) -> Self {
        Self {
            attribute: self.attribute,
            amount: -self.amount,
        }
    }
}

/// Current attribute values of a unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Attributes {
    pub resolve: i32,
    pub awareness: i32,
    pub fortitude: i32,
    pub willpower: i32,
    pub aggressiveness: i32,
    pub influence: i32,
    pub synapsis: i32,
    pub kismet: i32,
}

impl Attributes {
    /// Every attribute set to `value`.
    pub const fn uniform(value: i32) -> Self {
        Self {
            resolve: value,
            awareness: value,
            fortitude: value,
            willpower: value,
            aggressiveness: value,
            influence: value,
            synapsis: value,
            kismet: value,
        }
    }

    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Resolve => self.resolve,
            Attribute::Awareness => self.awareness,
            Attribute::Fortitude => self.fortitude,
            Attribute::Willpower => self.willpower,
            Attribute::Aggressiveness => self.aggressiveness,
            Attribute::Influence => self.influence,
            Attribute::Synapsis => self.synapsis,
            Attribute::Kismet => self.kismet,
        }
    }

    fn slot(&mut self, attribute: Attribute) -> &mut i32 {
        match attribute {
            Attribute::Resolve => &mut self.resolve,
            Attribute::Awareness => &mut self.awareness,
            Attribute::Fortitude => &mut self.fortitude,
            Attribute::Willpower => &mut self.willpower,
            Attribute::Aggressiveness => &mut self.aggressiveness,
            Attribute::Influence => &mut self.influence,
            Attribute::Synapsis => &mut self.synapsis,
            Attribute::Kismet => &mut self.kismet,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: i32) {
        *self.slot(attribute) = value;
    }

    /// Adds a flat modifier to the targeted attribute.
    pub fn apply(&mut self, modifier: StatModifier) {
        *self.slot(modifier.attribute) += modifier.amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn apply_then_reverse_restores_every_attribute() {
        let original = Attributes {
            resolve: 1,
            awareness: 2,
            fortitude: 3,
            willpower: 4,
            aggressiveness: 5,
            influence: 6,
            synapsis: 7,
            kismet: 8,
        };
        let mut attrs = original;

        for attribute in Attribute::iter() {
            attrs.apply(StatModifier::new(attribute, 3));
        }
        assert_ne!(attrs, original);

        for attribute in Attribute::iter() {
            attrs.apply(StatModifier::new(attribute, 3).reversed());
        }
        assert_eq!(attrs, original);
    }

    #[test]
    fn attribute_names_parse_case_insensitively() {
        assert_eq!("Fortitude".parse::<Attribute>(), Ok(Attribute::Fortitude));
        assert_eq!("kismet".parse::<Attribute>(), Ok(Attribute::Kismet));
        assert_eq!(Attribute::Aggressiveness.as_ref(), "aggressiveness");
    }
}
