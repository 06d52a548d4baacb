//! Enemy templates implementing [`game_core::EnemyFactory`].
use game_core::{EnemyFactory, EnemyTemplate, OracleError, UnitId, UnitRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// EnemyFactory implementation with static templates
///
/// Names match case-insensitively. Every created enemy gets a fresh id
/// counting up from the catalog's first id.
#[derive(Debug)]
pub struct EnemyCatalog {
    templates: HashMap<String, EnemyTemplate>,
    next_id: AtomicU32,
}

impl EnemyCatalog {
    /// Ids handed to enemies start here unless told otherwise.
    pub const FIRST_ID: u32 = 10_000;

    pub fn new() -> Self {
        Self::starting_at(Self::FIRST_ID)
    }

    pub fn starting_at(first_id: u32) -> Self {
        Self {
            templates: HashMap::new(),
            next_id: AtomicU32::new(first_id),
        }
    }

    pub fn from_templates(templates: impl IntoIterator<Item = EnemyTemplate>) -> Self {
        let mut catalog = Self::new();
        for template in templates {
            catalog.add_template(template);
        }
        catalog
    }

    /// Add an enemy template, replacing one with the same name
    pub fn add_template(&mut self, template: EnemyTemplate) {
        self.templates
            .insert(template.name.to_ascii_lowercase(), template);
    }

    pub fn template(&self, name: &str) -> Option<&EnemyTemplate> {
        self.templates.get(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for EnemyCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl EnemyFactory for EnemyCatalog {
    fn create_enemy(&self, template: &str, level: Option<u32>) -> Result<UnitRecord, OracleError> {
        let found = self
            .template(template)
            .ok_or_else(|| OracleError::EnemyTemplateNotFound(template.to_owned()))?;
        let id = UnitId(self.next_id.fetch_add(1, Ordering::Relaxed));
        Ok(found.instantiate(id, level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::Attributes;

    #[test]
    fn created_enemies_get_distinct_ids() {
        let catalog =
            EnemyCatalog::from_templates([EnemyTemplate::new("Rat", 8, Attributes::uniform(1))]);

        let first = catalog.create_enemy("rat", None).expect("rat exists");
        let second = catalog.create_enemy("RAT", Some(3)).expect("rat exists");

        assert_eq!(first.id, UnitId(EnemyCatalog::FIRST_ID));
        assert_eq!(second.id, UnitId(EnemyCatalog::FIRST_ID + 1));
        assert_eq!(second.level, 3);
        assert_eq!(first.name, "Rat");
    }

    #[test]
    fn unknown_template_is_reported() {
        let catalog = EnemyCatalog::new();
        assert!(catalog.is_empty());
        assert_eq!(
            catalog.create_enemy("Dragon", None).map(|unit| unit.id),
            Err(OracleError::EnemyTemplateNotFound("Dragon".to_owned()))
        );
    }
}
