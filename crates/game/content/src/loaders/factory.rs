//! Content factory for building core inputs from data files.

use std::path::{Path, PathBuf};

use game_core::{EventError, EventTemplate, GameConfig, TemplateSource};
use tracing::{error, warn};

use crate::loaders::{ConfigLoader, ContentManifest, LoadResult, ManifestLoader};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── manifest.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the directory containing data files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the data files shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    /// Load game configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        ConfigLoader::load(&self.config_path())
    }

    /// Load the content manifest from `manifest.ron`.
    pub fn load_manifest(&self) -> LoadResult<ContentManifest> {
        ManifestLoader::load(&self.manifest_path())
    }

    /// Load config and manifest and check that they agree.
    ///
    /// Events named by the config but missing from the manifest are logged;
    /// the event manager falls back to the default event for them. A missing
    /// stagger ailment is logged as well; stance breaks then leave units
    /// unstaggered.
    pub fn load_all(&self) -> LoadResult<(GameConfig, ContentManifest)> {
        let config = self.load_config()?;
        let manifest = self.load_manifest()?;

        for name in manifest.missing_events(&config) {
            warn!(event = %name, "configured event has no definition");
        }
        if !manifest
            .ailments
            .iter()
            .any(|ailment| ailment.name == config.stagger_effect)
        {
            error!(effect = %config.stagger_effect, "stagger ailment missing from manifest");
        }
        Ok((config, manifest))
    }

    /// Source that reads the event templates from this factory's manifest.
    pub fn template_source(&self) -> ManifestSource {
        ManifestSource::new(self.manifest_path())
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }

    fn manifest_path(&self) -> PathBuf {
        self.data_dir.join("manifest.ron")
    }
}

/// [`TemplateSource`] backed by a manifest file, read on demand.
#[derive(Clone, Debug)]
pub struct ManifestSource {
    path: PathBuf,
}

impl ManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TemplateSource for ManifestSource {
    fn load_templates(&self) -> Result<Vec<EventTemplate>, EventError> {
        let manifest = ManifestLoader::load(&self.path)
            .map_err(|err| EventError::TemplateSource(err.to_string()))?;
        Ok(manifest.templates())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
        assert_eq!(factory.manifest_path(), Path::new("/tmp/data/manifest.ron"));
    }
}
