//! Command implementations and dispatch logic.
//!
//! Every command loads a manifest and the layered settings through
//! [`CommandContext::load`], links it with the engine the settings select,
//! and renders the result.

use std::process::ExitCode;

use anyhow::Context;
use camino::Utf8PathBuf;
use serde_json::Value;
use tracing::{debug, info};

use tether_config::{Manifest, ManifestLoader, ManifestSource, Mode, Overrides, Settings, SettingsLoader};
use tether_core::{TetherError, TetherResult};
use tether_resolver::{Blocker, DepNode, DepResolver, Resolution, Summary, TreeNode, TreeResolver};

pub mod check;
pub mod order;
pub mod resolve;
pub mod why;


use crate::output::{colors::ColorSupport, OutputHandler};
use crate::Commands;

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    /// Explicit manifest path; discovered from `cwd` when absent
    pub manifest: Option<Utf8PathBuf>,
    pub settings: SettingsLoader,
    pub output: OutputHandler,
}

/// A manifest together with the settings it is resolved under
pub struct Loaded {
    pub manifest: Manifest,
    pub source: ManifestSource,
    pub settings: Settings,
    pub mode: Mode,
}

/// Result of either engine
pub enum Linked {
    Tree(Resolution<TreeNode<Value>>),
    Graph(Resolution<DepNode<Value>>),
}

/// How a command finished, short of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(
        manifest: Option<Utf8PathBuf>,
        config: Option<Utf8PathBuf>,
        colors: ColorSupport,
    ) -> TetherResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| TetherError::io("Failed to get current directory", e))?;
        let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| {
            TetherError::validation("cwd", format!("current directory is not valid UTF-8: {}", e))
        })?;

        let mut settings = SettingsLoader::new();
        if let Some(path) = config {
            settings = settings.with_config_path(path);
        }

        Ok(Self {
            cwd,
            manifest,
            settings,
            output: OutputHandler::with_colors(colors),
        })
    }

    /// Load the manifest, layer the settings and validate for the chosen mode
    pub async fn load(&self, cli: Overrides) -> anyhow::Result<Loaded> {
        let loader = ManifestLoader::new(self.cwd.clone());
        let (manifest, source) = match &self.manifest {
            Some(path) => loader.load(path).await,
            None => loader.discover().await,
        }
        .context("Failed to load manifest")?;

        let settings = self.settings.load(cli).await.context("Failed to load settings")?;
        let mode = settings.mode_for(&manifest);
        manifest
            .validate(mode)
            .with_context(|| format!("{} is not a valid {} manifest", source.path(), mode))?;

        debug!(
            path = %source.path(),
            mode = %mode,
            nodes = manifest.nodes.len(),
            "Loaded manifest"
        );

        Ok(Loaded {
            manifest,
            source,
            settings,
            mode,
        })
    }
}

impl Loaded {
    /// Run the engine for this manifest's mode
    pub fn link(&self) -> TetherResult<Linked> {
        let declarations = self.manifest.clone().into_declarations();

        match self.mode {
            Mode::Tree => {
                let tree = TreeResolver::with_policy(self.settings.duplicates);
                tree.extend(declarations);
                tree.into_resolution().map(Linked::Tree)
            },
            Mode::Graph => {
                let deps = DepResolver::with_policy(self.settings.duplicates);
                deps.extend(declarations);
                deps.into_resolution().map(Linked::Graph)
            },
        }
    }
}

impl Linked {
    pub fn summary(&self) -> Summary {
        match self {
            Linked::Tree(res) => res.summary(),
            Linked::Graph(res) => res.summary(),
        }
    }

    /// Every declared name, in declaration order
    pub fn names(&self) -> Vec<&str> {
        match self {
            Linked::Tree(res) => res.index().keys().map(String::as_str).collect(),
            Linked::Graph(res) => res.index().keys().map(String::as_str).collect(),
        }
    }
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
        }
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> anyhow::Result<ExitCode> {
    let outcome = match command {
        Commands::Resolve { opts, strict } => {
            info!("Resolving manifest (strict: {})", strict);
            resolve::execute(opts, strict, ctx).await?
        },
        Commands::Order { opts } => {
            debug!("Printing initialization order");
            order::execute(opts, ctx).await?
        },
        Commands::Why { name, opts } => {
            debug!("Explaining node: {}", name);
            why::execute(name, opts, ctx).await?
        },
        Commands::Check { opts } => {
            debug!("Checking manifest");
            check::execute(opts, ctx).await?
        },
    };

    Ok(outcome.into())
}

/// Human-readable reason a required parent did not link
pub fn describe_blocker(blocker: &Blocker) -> String {
    match blocker {
        Blocker::Missing(parent) => format!("parent '{}' is not declared", parent),
        Blocker::Unlinked(parent) => format!("parent '{}' is itself unlinked", parent),
    }
}

/// Suggest the closest declared name based on edit distance
pub fn suggest_similar_name<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for &candidate in candidates {
        let distance = edit_distance(input, candidate);
        if distance < best_distance && distance <= 2 {
            best_distance = distance;
            best_match = Some(candidate);
        }
    }

    best_match
}

/// Calculate edit distance between two strings
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Single-row Levenshtein
    let mut row: Vec<usize> = (0..=b_chars.len()).collect();
    for (i, &a_char) in a_chars.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            let substitution = diagonal + cost;
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(diagonal + 1);
        }
    }

    row[b_chars.len()]
}
