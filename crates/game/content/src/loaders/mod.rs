//! Content loaders for reading game data from files.
//!
//! This module provides loaders that convert RON/TOML files into core types:
//! the content manifest into templates and registries, the config file into
//! a [`game_core::GameConfig`].

pub mod config;
pub mod factory;
pub mod manifest;

pub use config::ConfigLoader;
pub use factory::{ContentFactory, ManifestSource};
pub use manifest::{ContentManifest, ManifestLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
