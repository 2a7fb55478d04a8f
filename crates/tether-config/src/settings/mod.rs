//! Settings layering and environment overrides
//!
//! Layers, lowest to highest: built-in defaults, the user config file
//! (`~/.config/tether/config.toml`), `TETHER_*` environment variables, CLI
//! flags. A mode set by the environment or the command line also beats the
//! mode written in a manifest; a mode from the user file only fills in for
//! manifests that do not name one.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;

use tether_core::{DuplicatePolicy, TetherError};

use crate::manifest::{Manifest, Mode};
use crate::ConfigResult;

/// Prefix of every environment variable read as an override
pub const ENV_PREFIX: &str = "TETHER_";

/// How resolution results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// A partial settings layer; `None` leaves the lower layer in place
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Overrides {
    pub mode: Option<Mode>,
    pub format: Option<OutputFormat>,
    pub strict: Option<bool>,
    pub duplicates: Option<DuplicatePolicy>,
}

/// Where a settings layer came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// User config file
    UserFile(Utf8PathBuf),
    /// `TETHER_*` environment variables
    Environment,
    /// CLI flags
    CommandLine,
}

/// Effective settings after layering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Mode for manifests that do not name one
    pub mode: Mode,
    /// Mode pinned by the environment or the command line
    pub mode_override: Option<Mode>,
    pub format: OutputFormat,
    /// Treat unlinked nodes as a failure
    pub strict: bool,
    pub duplicates: DuplicatePolicy,
    /// Layers that contributed, lowest first
    pub sources: Vec<ConfigSource>,
}

/// Loads the user layer and the environment, then merges
pub struct SettingsLoader {
    config_path: Option<Utf8PathBuf>,
    env: HashMap<String, String>,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = TetherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(TetherError::validation(
                "format",
                format!("expected 'text' or 'json', got '{}'", other),
            )),
        }
    }
}

impl Overrides {
    /// Read overrides from `TETHER_*` variables.
    ///
    /// Unknown `TETHER_*` names are ignored; known names with bad values fail.
    pub fn from_env(vars: &HashMap<String, String>) -> ConfigResult<Self> {
        let mut overrides = Self::default();

        for (key, value) in vars {
            match key.as_str() {
                "TETHER_MODE" => {
                    overrides.mode = Some(value.parse().map_err(|e| rename_field(e, key))?);
                },
                "TETHER_FORMAT" => {
                    overrides.format = Some(value.parse().map_err(|e| rename_field(e, key))?);
                },
                "TETHER_STRICT" => {
                    overrides.strict = Some(parse_flag(key, value)?);
                },
                "TETHER_DUPLICATES" => {
                    overrides.duplicates = Some(
                        value
                            .parse()
                            .map_err(|reason: String| TetherError::validation(key.as_str(), reason))?,
                    );
                },
                _ => {
                    // Unknown environment variable, ignore
                },
            }
        }

        Ok(overrides)
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl Settings {
    /// Merge layers over the defaults, lowest first
    pub fn merge(layers: impl IntoIterator<Item = (ConfigSource, Overrides)>) -> Self {
        let mut settings = Self::default();

        for (source, layer) in layers {
            if layer.is_empty() {
                continue;
            }

            if let Some(mode) = layer.mode {
                match source {
                    ConfigSource::UserFile(_) => settings.mode = mode,
                    ConfigSource::Environment | ConfigSource::CommandLine => {
                        settings.mode_override = Some(mode)
                    },
                }
            }
            if let Some(format) = layer.format {
                settings.format = format;
            }
            if let Some(strict) = layer.strict {
                settings.strict = strict;
            }
            if let Some(duplicates) = layer.duplicates {
                settings.duplicates = duplicates;
            }
            settings.sources.push(source);
        }

        settings
    }

    /// Mode to resolve `manifest` with
    pub fn mode_for(&self, manifest: &Manifest) -> Mode {
        self.mode_override.unwrap_or_else(|| manifest.mode_or(self.mode))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            mode_override: None,
            format: OutputFormat::default(),
            strict: false,
            duplicates: DuplicatePolicy::default(),
            sources: Vec::new(),
        }
    }
}

impl SettingsLoader {
    /// Loader reading the default user config file and the process environment
    pub fn new() -> Self {
        Self {
            config_path: default_config_path(),
            env: collect_env_overrides(),
        }
    }

    /// Use `path` as the user config file instead of the default location
    pub fn with_config_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Use `vars` instead of the process environment
    pub fn with_env(mut self, vars: HashMap<String, String>) -> Self {
        self.env = vars;
        self
    }

    pub fn config_path(&self) -> Option<&Utf8Path> {
        self.config_path.as_deref()
    }

    /// Read the user config file, if there is one
    pub async fn load_user_config(&self) -> ConfigResult<Option<Overrides>> {
        let Some(path) = &self.config_path else {
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| TetherError::io(format!("Failed to read {}", path), e))?;

        let overrides = toml::from_str(&content).map_err(|e| TetherError::ManifestParse {
            path: path.to_string(),
            message: format!("TOML parsing error: {}", e),
        })?;

        Ok(Some(overrides))
    }

    /// Layer user file, environment and `cli` over the defaults
    pub async fn load(&self, cli: Overrides) -> ConfigResult<Settings> {
        let mut layers = Vec::new();

        if let (Some(path), Some(user)) = (&self.config_path, self.load_user_config().await?) {
            layers.push((ConfigSource::UserFile(path.clone()), user));
        }
        layers.push((ConfigSource::Environment, Overrides::from_env(&self.env)?));
        layers.push((ConfigSource::CommandLine, cli));

        let settings = Settings::merge(layers);
        debug!(
            mode = %settings.mode,
            format = %settings.format,
            strict = settings.strict,
            layers = settings.sources.len(),
            "Loaded settings"
        );

        Ok(settings)
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// `~/.config/tether/config.toml`, or the platform equivalent
pub fn default_config_path() -> Option<Utf8PathBuf> {
    let dir = dirs::config_dir()?;
    let dir = Utf8PathBuf::try_from(dir).ok()?;
    Some(dir.join("tether").join("config.toml"))
}

/// Collect `TETHER_*` variables from the process environment
pub fn collect_env_overrides() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect()
}

fn parse_flag(field: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(TetherError::validation(
            field,
            format!("expected a boolean, got '{}'", other),
        )),
    }
}

fn rename_field(err: TetherError, field: &str) -> TetherError {
    match err {
        TetherError::ConfigValidation { reason, .. } => TetherError::validation(field, reason),
        other => other,
    }
}
