//! Declaration manifests, format-independent
//!
//! A manifest is a resolution mode plus a list of `[[node]]` entries. Both
//! the TOML and JSON front ends deserialize into the same [`Manifest`].

use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use tether_core::utils::{find_duplicates, validate_name};
use tether_core::{Declaration, IntoNames, TetherError};

use crate::ConfigResult;

/// File names looked up by [`ManifestLoader::discover`], in order
pub const MANIFEST_FILES: [&str; 2] = ["tether.toml", "tether.json"];

/// Which engine links the declarations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Single parent per node, producing a forest
    Tree,
    /// Required and optional parents, producing a DAG
    #[default]
    Graph,
}

/// A parsed manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Mode requested by the manifest itself, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,

    /// Node entries, in declaration order
    #[serde(default, rename = "node")]
    pub nodes: Vec<NodeEntry>,
}

/// One `[[node]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeEntry {
    pub name: String,

    /// Required parents
    #[serde(default, skip_serializing_if = "NameList::is_empty")]
    pub parents: NameList,

    /// Parents linked only when present (graph mode only)
    #[serde(default, skip_serializing_if = "NameList::is_empty")]
    pub optional: NameList,

    /// Opaque value carried through resolution
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

/// A list of names written either as one string or as an array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameList {
    One(String),
    Many(Vec<String>),
}

/// Where a manifest was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    Toml(Utf8PathBuf),
    Json(Utf8PathBuf),
}

/// Locates and loads manifests relative to a working directory
pub struct ManifestLoader {
    cwd: Utf8PathBuf,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Tree => "tree",
            Mode::Graph => "graph",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = TetherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" => Ok(Mode::Tree),
            "graph" => Ok(Mode::Graph),
            other => Err(TetherError::validation(
                "mode",
                format!("expected 'tree' or 'graph', got '{}'", other),
            )),
        }
    }
}

impl NameList {
    pub fn len(&self) -> usize {
        match self {
            NameList::One(_) => 1,
            NameList::Many(names) => names.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let names: &[String] = match self {
            NameList::One(name) => std::slice::from_ref(name),
            NameList::Many(names) => names,
        };
        names.iter().map(String::as_str)
    }
}

impl Default for NameList {
    fn default() -> Self {
        NameList::Many(Vec::new())
    }
}

impl IntoNames for NameList {
    fn into_names(self) -> Vec<String> {
        match self {
            NameList::One(name) => vec![name],
            NameList::Many(names) => names,
        }
    }
}

impl NodeEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: NameList::default(),
            optional: NameList::default(),
            payload: Value::Null,
        }
    }

    pub fn into_declaration(self) -> Declaration<Value> {
        Declaration::with_payload(self.name, self.payload)
            .with_parents(self.parents)
            .with_optional_parents(self.optional)
    }
}

impl Manifest {
    /// Mode to use when nothing more specific is configured
    pub fn mode_or(&self, fallback: Mode) -> Mode {
        self.mode.unwrap_or(fallback)
    }

    /// Names declared more than once
    pub fn duplicate_names(&self) -> Vec<&str> {
        find_duplicates(self.nodes.iter().map(|node| node.name.as_str()))
    }

    /// Check names and, for tree mode, the single-parent shape of every entry
    pub fn validate(&self, mode: Mode) -> ConfigResult<()> {
        for (i, node) in self.nodes.iter().enumerate() {
            validate_name(&format!("node[{}].name", i), &node.name)?;

            for parent in node.parents.iter() {
                validate_name(&format!("node[{}].parents", i), parent)?;
            }
            for parent in node.optional.iter() {
                validate_name(&format!("node[{}].optional", i), parent)?;
            }

            if mode == Mode::Tree {
                if node.parents.len() > 1 {
                    return Err(TetherError::validation(
                        format!("node[{}].parents", i),
                        format!(
                            "'{}' declares {} parents; tree mode allows at most one",
                            node.name,
                            node.parents.len()
                        ),
                    ));
                }
                if !node.optional.is_empty() {
                    return Err(TetherError::validation(
                        format!("node[{}].optional", i),
                        format!("'{}' declares optional parents; tree mode has none", node.name),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Convert every entry into a declaration, in manifest order
    pub fn into_declarations(self) -> Vec<Declaration<Value>> {
        self.nodes.into_iter().map(NodeEntry::into_declaration).collect()
    }
}

impl ManifestSource {
    pub fn path(&self) -> &Utf8Path {
        match self {
            ManifestSource::Toml(path) | ManifestSource::Json(path) => path,
        }
    }
}

impl ManifestLoader {
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd }
    }

    /// Load a manifest from an explicit path, picking the parser by extension
    pub async fn load(&self, path: &Utf8Path) -> ConfigResult<(Manifest, ManifestSource)> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        };

        if path.extension() == Some("json") {
            let manifest = crate::json::load_from_file(&path).await?;
            Ok((manifest, ManifestSource::Json(path)))
        } else {
            let manifest = crate::toml::load_from_file(&path).await?;
            Ok((manifest, ManifestSource::Toml(path)))
        }
    }

    /// Find the nearest manifest walking up from the working directory
    pub async fn discover(&self) -> ConfigResult<(Manifest, ManifestSource)> {
        let path = self.find_manifest().ok_or_else(|| {
            TetherError::validation(
                "manifest",
                format!(
                    "No {} found in {} or its parent directories",
                    MANIFEST_FILES.join(" or "),
                    self.cwd
                ),
            )
        })?;

        debug!(path = %path, "Discovered manifest");
        self.load(&path).await
    }

    /// Nearest directory containing a manifest file, TOML preferred
    pub fn find_manifest(&self) -> Option<Utf8PathBuf> {
        self.cwd.ancestors().find_map(|dir| {
            MANIFEST_FILES
                .iter()
                .map(|file| dir.join(file))
                .find(|candidate| candidate.is_file())
        })
    }
}
