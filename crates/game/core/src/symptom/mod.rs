//! Generic buff/debuff ledger with stacking, durations and manifestations.
//!
//! A [`Symptom`] template carries three manifestation lists. While a symptom
//! is active its lists are registered into the carrier's buckets, which the
//! battle loop drains at the start and end of each of the carrier's turns.
//! Persistent manifestations fire once when the symptom is first applied;
//! the attribute changes among them are undone when it is removed.
mod ledger;
mod manifestation;

pub use ledger::{ActiveSymptom, ManifestationBuckets, SymptomChange, SymptomLedger};
pub use manifestation::{Manifestation, ManifestationSet};

/// Immutable symptom template.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Symptom {
    pub name: String,
    pub stackable: bool,
    pub max_stacks: u32,
    /// Turns until the symptom wears off; `None` lasts until removed.
    pub duration: Option<i32>,
    pub on_applied: ManifestationSet,
    /// Registered in place of `on_applied` once the symptom is gone.
    pub on_removed: Option<ManifestationSet>,
}

impl Symptom {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn stackable(mut self, max_stacks: u32) -> Self {
        self.stackable = true;
        self.max_stacks = max_stacks.max(1);
        self
    }

    pub fn lasting(mut self, turns: i32) -> Self {
        self.duration = Some(turns);
        self
    }

    pub fn with_manifestations(mut self, set: ManifestationSet) -> Self {
        self.on_applied = set;
        self
    }

    pub fn with_removal(mut self, set: ManifestationSet) -> Self {
        self.on_removed = Some(set);
        self
    }
}

impl Default for Symptom {
    fn default() -> Self {
        Self {
            name: String::new(),
            stackable: false,
            max_stacks: 1,
            duration: None,
            on_applied: ManifestationSet::default(),
            on_removed: None,
        }
    }
}
