use std::sync::Arc;

use tracing::{debug, warn};

use super::{Manifestation, ManifestationSet, Symptom};
use crate::state::{UnitId, UnitRecord};

/// Runtime record of an active symptom.
#[derive(Clone, Debug)]
pub struct ActiveSymptom {
    pub symptom: Arc<Symptom>,
    pub stacks: u32,
    pub duration: Option<i32>,
}

impl ActiveSymptom {
    pub fn name(&self) -> &str {
        &self.symptom.name
    }

    pub fn max_stacks(&self) -> u32 {
        self.symptom.max_stacks
    }

    pub fn max_duration(&self) -> Option<i32> {
        self.symptom.duration
    }
}

/// What an apply or remove call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymptomChange {
    Applied,
    Stacked { stacks: u32 },
    Refreshed,
    Decremented { stacks: u32 },
    Removed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Registered {
    source: String,
    /// Registered by a removal list rather than an active symptom.
    removal: bool,
    manifestation: Manifestation,
}

/// Manifestations currently registered on a unit, by firing time.
#[derive(Clone, Debug, Default)]
pub struct ManifestationBuckets {
    start_of_turn: Vec<Registered>,
    persistent: Vec<Registered>,
    end_of_turn: Vec<Registered>,
}

impl ManifestationBuckets {
    fn register(&mut self, unit: UnitId, source: &str, removal: bool, set: &ManifestationSet) {
        let lists = [
            (&mut self.start_of_turn, &set.start_of_turn),
            (&mut self.persistent, &set.persistent),
            (&mut self.end_of_turn, &set.end_of_turn),
        ];
        for (bucket, manifestations) in lists {
            for manifestation in manifestations {
                let entry = Registered {
                    source: source.to_owned(),
                    removal,
                    manifestation: *manifestation,
                };
                if !bucket.contains(&entry) {
                    manifestation.on_register(unit, source);
                    bucket.push(entry);
                }
            }
        }
    }

    fn unregister(&mut self, unit: UnitId, source: &str, removal: bool) {
        for bucket in [
            &mut self.start_of_turn,
            &mut self.persistent,
            &mut self.end_of_turn,
        ] {
            bucket.retain(|entry| {
                let matches = entry.source == source && entry.removal == removal;
                if matches {
                    entry.manifestation.on_unregister(unit, source);
                }
                !matches
            });
        }
    }

    pub fn contains(&self, manifestation: Manifestation) -> bool {
        self.start_of_turn
            .iter()
            .chain(&self.persistent)
            .chain(&self.end_of_turn)
            .any(|entry| entry.manifestation == manifestation)
    }

    pub fn start_of_turn(&self) -> impl Iterator<Item = &Manifestation> {
        self.start_of_turn.iter().map(|entry| &entry.manifestation)
    }

    pub fn persistent(&self) -> impl Iterator<Item = &Manifestation> {
        self.persistent.iter().map(|entry| &entry.manifestation)
    }

    pub fn end_of_turn(&self) -> impl Iterator<Item = &Manifestation> {
        self.end_of_turn.iter().map(|entry| &entry.manifestation)
    }
}

/// Active symptoms of one unit plus the manifestations they registered.
#[derive(Clone, Debug, Default)]
pub struct SymptomLedger {
    active: Vec<ActiveSymptom>,
    buckets: ManifestationBuckets,
}

impl SymptomLedger {
    pub fn iter(&self) -> impl Iterator<Item = &ActiveSymptom> {
        self.active.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ActiveSymptom> {
        self.active.iter().find(|active| active.name() == name)
    }

    pub fn buckets(&self) -> &ManifestationBuckets {
        &self.buckets
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.active.iter().position(|active| active.name() == name)
    }

    fn stacks_for(&self, entry: &Registered) -> u32 {
        if entry.removal {
            return 1;
        }
        self.get(&entry.source).map_or(1, |active| active.stacks)
    }

    fn collect(&self, bucket: &[Registered]) -> Vec<(Manifestation, u32)> {
        bucket
            .iter()
            .map(|entry| (entry.manifestation, self.stacks_for(entry)))
            .collect()
    }
}

impl UnitRecord {
    pub fn symptoms(&self) -> &SymptomLedger {
        &self.symptoms
    }

    pub fn has_symptom(&self, name: &str) -> bool {
        self.symptoms.get(name).is_some()
    }

    /// Whether any registered manifestation keeps this unit from acting.
    pub fn skips_turn(&self) -> bool {
        self.symptoms.buckets.contains(Manifestation::SkipTurn)
    }

    /// Applies a symptom or, when already active, stacks and refreshes it.
    ///
    /// Returns `None` when the unit is defeated.
    pub fn apply_symptom(&mut self, symptom: Arc<Symptom>) -> Option<SymptomChange> {
        if !self.is_alive() {
            warn!(unit = %self.id, symptom = %symptom.name, "ignoring symptom on a defeated unit");
            return None;
        }

        if let Some(index) = self.symptoms.position(&symptom.name) {
            let active = &mut self.symptoms.active[index];
            active.duration = active.max_duration();

            if active.symptom.stackable && active.stacks < active.max_stacks() {
                active.stacks += 1;
                let stacks = active.stacks;
                debug!(unit = %self.id, symptom = %symptom.name, stacks, "symptom stack changed");
                return Some(SymptomChange::Stacked { stacks });
            }
            return Some(SymptomChange::Refreshed);
        }

        let id = self.id;
        let ledger = &mut self.symptoms;
        ledger.buckets.unregister(id, &symptom.name, true);
        ledger.buckets.register(id, &symptom.name, false, &symptom.on_applied);
        ledger.active.push(ActiveSymptom {
            symptom: Arc::clone(&symptom),
            stacks: 1,
            duration: symptom.duration,
        });

        debug!(unit = %id, symptom = %symptom.name, "symptom applied");
        for manifestation in &symptom.on_applied.persistent {
            manifestation.execute(self, 1);
        }
        Some(SymptomChange::Applied)
    }

    /// Removes one stack, or the whole symptom once no stacks remain.
    pub fn remove_symptom(&mut self, name: &str) -> Option<SymptomChange> {
        let index = self.symptoms.position(name)?;
        let active = &mut self.symptoms.active[index];

        if active.symptom.stackable && active.stacks > 1 {
            active.stacks -= 1;
            let stacks = active.stacks;
            debug!(unit = %self.id, symptom = name, stacks, "symptom stack changed");
            return Some(SymptomChange::Decremented { stacks });
        }

        self.remove_symptom_at(index);
        Some(SymptomChange::Removed)
    }

    fn remove_symptom_at(&mut self, index: usize) {
        let id = self.id;
        let symptom = self.symptoms.active.remove(index).symptom;
        self.symptoms.buckets.unregister(id, &symptom.name, false);
        for manifestation in &symptom.on_applied.persistent {
            manifestation.revert(self);
        }
        debug!(unit = %id, symptom = %symptom.name, "symptom removed");

        if let Some(removal) = &symptom.on_removed {
            self.symptoms.buckets.register(id, &symptom.name, true, removal);
            for manifestation in &removal.persistent {
                manifestation.execute(self, 1);
            }
        }
    }

    /// Counts every finite duration down by one and removes the symptoms
    /// that ran out, whatever their stack count. Returns their names.
    pub fn update_symptom_durations(&mut self) -> Vec<String> {
        let mut expired = Vec::new();
        for active in &mut self.symptoms.active {
            if let Some(duration) = active.duration.as_mut() {
                *duration -= 1;
                if *duration <= 0 {
                    expired.push(active.name().to_owned());
                }
            }
        }

        for name in &expired {
            if let Some(index) = self.symptoms.position(name) {
                self.remove_symptom_at(index);
            }
        }
        expired
    }

    pub fn run_start_of_turn_manifestations(&mut self) {
        let pending = self.symptoms.collect(&self.symptoms.buckets.start_of_turn);
        for (manifestation, stacks) in pending {
            manifestation.execute(self, stacks);
        }
    }

    pub fn run_end_of_turn_manifestations(&mut self) {
        let pending = self.symptoms.collect(&self.symptoms.buckets.end_of_turn);
        for (manifestation, stacks) in pending {
            manifestation.execute(self, stacks);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{Attribute, Attributes};

    fn unit() -> UnitRecord {
        UnitRecord::new(UnitId(7), "Carrier", Attributes::uniform(2), 60)
    }

    fn bleeding() -> Arc<Symptom> {
        Arc::new(
            Symptom::new("Bleeding")
                .stackable(3)
                .lasting(2)
                .with_manifestations(
                    ManifestationSet::default().end(Manifestation::Damage { amount: 2 }),
                ),
        )
    }

    #[test]
    fn stacks_up_to_the_cap_and_refreshes_duration() {
        let mut unit = unit();
        let symptom = bleeding();

        assert_eq!(unit.apply_symptom(Arc::clone(&symptom)), Some(SymptomChange::Applied));
        unit.update_symptom_durations();
        assert_eq!(unit.symptoms().get("Bleeding").and_then(|a| a.duration), Some(1));

        assert_eq!(
            unit.apply_symptom(Arc::clone(&symptom)),
            Some(SymptomChange::Stacked { stacks: 2 })
        );
        assert_eq!(unit.symptoms().get("Bleeding").and_then(|a| a.duration), Some(2));
        unit.apply_symptom(Arc::clone(&symptom));
        assert_eq!(unit.apply_symptom(symptom), Some(SymptomChange::Refreshed));
        assert_eq!(unit.symptoms().get("Bleeding").map(|a| a.stacks), Some(3));
    }

    #[test]
    fn manifestations_scale_with_stacks() {
        let mut unit = unit();
        unit.apply_symptom(bleeding());
        unit.apply_symptom(bleeding());

        unit.run_end_of_turn_manifestations();
        assert_eq!(unit.health().current(), 56);
    }

    #[test]
    fn removing_decrements_stacks_before_removing() {
        let mut unit = unit();
        unit.apply_symptom(bleeding());
        unit.apply_symptom(bleeding());

        assert_eq!(
            unit.remove_symptom("Bleeding"),
            Some(SymptomChange::Decremented { stacks: 1 })
        );
        assert_eq!(unit.remove_symptom("Bleeding"), Some(SymptomChange::Removed));
        assert!(!unit.symptoms().buckets().contains(Manifestation::Damage { amount: 2 }));
        assert_eq!(unit.remove_symptom("Bleeding"), None);
    }

    #[test]
    fn persistent_manifestations_fire_once_on_apply() {
        let mut unit = unit();
        let focus = Arc::new(Symptom::new("Focused").with_manifestations(
            ManifestationSet::default().persistent(Manifestation::Modify {
                attribute: Attribute::Aggressiveness,
                amount: 2,
            }),
        ));

        unit.apply_symptom(Arc::clone(&focus));
        unit.apply_symptom(focus);
        assert_eq!(unit.attribute(Attribute::Aggressiveness), 4);
    }

    #[test]
    fn attribute_changes_are_undone_when_the_symptom_goes() {
        let mut unit = unit();
        let focus = Arc::new(
            Symptom::new("Focused")
                .lasting(1)
                .with_manifestations(ManifestationSet::default().persistent(
                    Manifestation::Modify {
                        attribute: Attribute::Fortitude,
                        amount: 3,
                    },
                )),
        );

        unit.apply_symptom(Arc::clone(&focus));
        assert_eq!(unit.attribute(Attribute::Fortitude), 5);
        assert_eq!(unit.remove_symptom("Focused"), Some(SymptomChange::Removed));
        assert_eq!(unit.attribute(Attribute::Fortitude), 2);

        unit.apply_symptom(focus);
        unit.update_symptom_durations();
        assert_eq!(unit.attribute(Attribute::Fortitude), 2);
    }

    #[test]
    fn expiry_swaps_in_removal_manifestations() {
        let mut unit = unit();
        let dazed = Arc::new(
            Symptom::new("Dazed")
                .lasting(1)
                .with_manifestations(ManifestationSet::default().start(Manifestation::SkipTurn))
                .with_removal(ManifestationSet::default().persistent(Manifestation::ResetStance)),
        );

        unit.apply_symptom(dazed);
        assert!(unit.skips_turn());

        unit.reduce_stance(10);
        assert_eq!(unit.update_symptom_durations(), vec!["Dazed".to_owned()]);
        assert!(!unit.skips_turn());
        assert!(!unit.has_symptom("Dazed"));
        assert_eq!(unit.stance().current(), unit.stance().max());
    }
}
