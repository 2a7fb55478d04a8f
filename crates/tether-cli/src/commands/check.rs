//! `tether check` command implementation.
//!
//! Validates the manifest for the selected mode and reports repeated names
//! without linking anything. With `--format json` the normalized manifest is
//! printed instead.

use anyhow::Context;

use tether_config::OutputFormat;
use tether_core::DuplicatePolicy;

use super::{CommandContext, Outcome};
use crate::ResolveOpts;

/// Execute the `tether check` command
pub async fn execute(opts: ResolveOpts, ctx: &CommandContext) -> anyhow::Result<Outcome> {
    let loaded = ctx.load(opts.overrides(None)).await?;

    let duplicates = loaded.manifest.duplicate_names();
    if !duplicates.is_empty() {
        let list = duplicates.join(", ");
        if loaded.settings.duplicates == DuplicatePolicy::Reject {
            ctx.output.error(&format!("Names declared more than once: {}", list));
            return Ok(Outcome::Failure);
        }
        ctx.output.warn(&format!(
            "Names declared more than once ({} applies): {}",
            loaded.settings.duplicates, list
        ));
    }

    match loaded.settings.format {
        OutputFormat::Text => ctx.output.success(&format!(
            "{} is a valid {} manifest with {} nodes",
            loaded.source.path(),
            loaded.mode,
            loaded.manifest.nodes.len()
        )),
        OutputFormat::Json => {
            let json = tether_config::json::serialize_manifest(&loaded.manifest)
                .context("Failed to serialize manifest")?;
            ctx.output.print(&format!("{}\n", json));
        },
    }

    Ok(Outcome::Success)
}
