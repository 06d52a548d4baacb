//! Name-keyed registries of ailment and symptom templates.
//!
//! Built once at startup from the content manifest and shared read-only by
//! the event manager and the battle system.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::status::Ailment;
use crate::symptom::Symptom;

#[derive(Clone, Debug, Default)]
pub struct Registry {
    ailments: HashMap<String, Arc<Ailment>>,
    symptoms: HashMap<String, Arc<Symptom>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the stance-break ailment under `stagger_name`.
    pub fn with_stagger(stagger_name: &str) -> Self {
        let mut registry = Self::new();
        registry.register_ailment(Ailment::staggered(stagger_name));
        registry
    }

    /// Registers an ailment. A duplicate name replaces the earlier template.
    pub fn register_ailment(&mut self, ailment: Ailment) {
        let name = ailment.name.clone();
        if self.ailments.insert(name.clone(), Arc::new(ailment)).is_some() {
            warn!(ailment = %name, "duplicate ailment template, last registration wins");
        }
    }

    /// Registers a symptom. A duplicate name replaces the earlier template.
    pub fn register_symptom(&mut self, symptom: Symptom) {
        let name = symptom.name.clone();
        if self.symptoms.insert(name.clone(), Arc::new(symptom)).is_some() {
            warn!(symptom = %name, "duplicate symptom template, last registration wins");
        }
    }

    pub fn ailment(&self, name: &str) -> Option<Arc<Ailment>> {
        self.ailments.get(name).cloned()
    }

    pub fn symptom(&self, name: &str) -> Option<Arc<Symptom>> {
        self.symptoms.get(name).cloned()
    }

    pub fn ailment_count(&self) -> usize {
        self.ailments.len()
    }

    pub fn symptom_count(&self) -> usize {
        self.symptoms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_registration_wins() {
        let mut registry = Registry::new();
        registry.register_ailment(Ailment::new("Poisoned", 2));
        registry.register_ailment(Ailment::new("Poisoned", 5));

        assert_eq!(registry.ailment_count(), 1);
        assert_eq!(registry.ailment("Poisoned").map(|a| a.duration), Some(5));
    }

    #[test]
    fn stagger_registry_knows_its_ailment() {
        let registry = Registry::with_stagger("Staggered");
        assert!(registry.ailment("Staggered").is_some());
        assert!(registry.symptom("Staggered").is_none());
    }
}
