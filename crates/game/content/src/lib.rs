//! Data-driven content definitions and loaders.
//!
//! This crate provides loaders for the RON/TOML data files under `data/`:
//! - Event templates with their steps (RON manifest)
//! - Ailment and symptom templates for the registry (RON manifest)
//! - Enemy templates for encounters (RON manifest)
//! - Game configuration (TOML)
//!
//! Everything is read once at startup; the runtime turns it into templates,
//! registries and oracles. All loaders use game-core types directly with
//! serde for RON/TOML deserialization.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, ContentManifest, ManifestLoader, ManifestSource};
