//! Manifests and settings for Tether
//!
//! This crate reads declaration manifests (`tether.toml` or `tether.json`)
//! into [`Manifest`] values and layers the user's [`Settings`] from defaults,
//! the user config file, `TETHER_*` environment variables and CLI flags.

pub mod json;
pub mod manifest;
pub mod settings;
pub mod toml;

// Re-export main types
pub use manifest::{Manifest, ManifestLoader, ManifestSource, Mode, NameList, NodeEntry};
pub use settings::{ConfigSource, OutputFormat, Overrides, Settings, SettingsLoader};

use tether_core::TetherError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, TetherError>;
