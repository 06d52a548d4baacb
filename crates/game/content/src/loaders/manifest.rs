//! Content manifest loader.
//!
//! The manifest enumerates every event, ailment, symptom and enemy the game
//! knows about. It is read once at startup; nothing is discovered by
//! scanning directories.

use std::collections::HashSet;
use std::path::Path;

use game_core::{
    Ailment, EnemyTemplate, EventDef, EventTemplate, GameConfig, Registry, Symptom,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::loaders::{LoadResult, read_file};

/// Everything listed in `manifest.ron`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContentManifest {
    pub events: Vec<EventDef>,
    pub ailments: Vec<Ailment>,
    pub symptoms: Vec<Symptom>,
    pub enemies: Vec<EnemyTemplate>,
}

impl ContentManifest {
    /// Builds one template per event definition.
    pub fn templates(&self) -> Vec<EventTemplate> {
        self.events.iter().cloned().map(EventDef::build).collect()
    }

    /// Registry holding every ailment and symptom of the manifest.
    pub fn registry(&self) -> Registry {
        let mut registry = Registry::new();
        for ailment in &self.ailments {
            registry.register_ailment(ailment.clone());
        }
        for symptom in &self.symptoms {
            registry.register_symptom(symptom.clone());
        }
        registry
    }

    pub fn enemy(&self, name: &str) -> Option<&EnemyTemplate> {
        self.enemies
            .iter()
            .find(|enemy| enemy.name.eq_ignore_ascii_case(name))
    }

    /// Event names the config relies on that no definition provides.
    pub fn missing_events(&self, config: &GameConfig) -> Vec<String> {
        let known: HashSet<String> = self
            .events
            .iter()
            .map(|event| event.name.to_lowercase())
            .collect();

        let assigned = config
            .assignment
            .categories
            .iter()
            .flat_map(|category| category.events.iter().map(|entry| entry.name.as_str()));

        let mut missing = Vec::new();
        for name in std::iter::once(config.default_event.as_str()).chain(assigned) {
            if !known.contains(&name.to_lowercase()) && !missing.iter().any(|m| m == name) {
                missing.push(name.to_owned());
            }
        }
        missing
    }
}

/// Loader for the content manifest from RON files.
pub struct ManifestLoader;

impl ManifestLoader {
    /// Load the manifest from a RON file.
    pub fn load(path: &Path) -> LoadResult<ContentManifest> {
        let content = read_file(path)?;
        let manifest = Self::parse(&content)?;
        debug!(
            path = %path.display(),
            events = manifest.events.len(),
            ailments = manifest.ailments.len(),
            symptoms = manifest.symptoms.len(),
            enemies = manifest.enemies.len(),
            "content manifest loaded"
        );
        Ok(manifest)
    }

    /// Parse the manifest from RON text.
    ///
    /// Duplicate event names are allowed; the last definition wins once
    /// registered, matching the event manager.
    pub fn parse(content: &str) -> LoadResult<ContentManifest> {
        let manifest: ContentManifest = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse content manifest RON: {}", e))?;

        let mut seen = HashSet::new();
        for event in &manifest.events {
            if event.name.trim().is_empty() {
                anyhow::bail!("event definition without a name");
            }
            if !seen.insert(event.name.to_lowercase()) {
                warn!(event = %event.name, "duplicate event definition");
            }
        }
        Ok(manifest)
    }
}
