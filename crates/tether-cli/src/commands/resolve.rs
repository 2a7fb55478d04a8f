//! `tether resolve` command implementation.
//!
//! Links the manifest and prints the roots, the initialization order and
//! every unlinked node with the parents it is waiting on.

use anyhow::Context;
use serde::Serialize;
use tracing::warn;

use tether_config::{Mode, OutputFormat};
use tether_resolver::{Blocker, LinkedNode, Resolution, Summary};

use super::{describe_blocker, CommandContext, Linked, Outcome};
use crate::output::colors::ColorSupport;
use crate::ResolveOpts;

/// JSON shape of `tether resolve --format json`
#[derive(Serialize)]
struct ResolveReport<'a, N> {
    mode: Mode,
    summary: Summary,
    blocked: Vec<BlockedNode<'a>>,
    #[serde(flatten)]
    resolution: &'a Resolution<N>,
}

#[derive(Serialize)]
struct BlockedNode<'a> {
    name: &'a str,
    blockers: Vec<Blocker>,
}

/// Execute the `tether resolve` command
pub async fn execute(opts: ResolveOpts, strict: bool, ctx: &CommandContext) -> anyhow::Result<Outcome> {
    let loaded = ctx.load(opts.overrides(strict.then_some(true))).await?;
    let linked = loaded.link().context("Failed to link declarations")?;

    let rendered = match (&linked, loaded.settings.format) {
        (Linked::Tree(res), OutputFormat::Text) => render_text(res, loaded.mode, ctx.output.colors()),
        (Linked::Graph(res), OutputFormat::Text) => render_text(res, loaded.mode, ctx.output.colors()),
        (Linked::Tree(res), OutputFormat::Json) => render_json(res, loaded.mode)?,
        (Linked::Graph(res), OutputFormat::Json) => render_json(res, loaded.mode)?,
    };
    ctx.output.print(&rendered);

    let summary = linked.summary();
    if summary.unlinked == 0 {
        return Ok(Outcome::Success);
    }

    warn!(unlinked = summary.unlinked, "Resolution left nodes unlinked");
    if loaded.settings.strict {
        ctx.output.error(&format!(
            "{} of {} nodes could not be linked",
            summary.unlinked, summary.total
        ));
        return Ok(Outcome::Failure);
    }

    Ok(Outcome::Success)
}

/// Plain-text report of one resolution
pub fn render_text<N: LinkedNode>(res: &Resolution<N>, mode: Mode, colors: &ColorSupport) -> String {
    let mut output = String::new();

    output.push_str(&colors.bold(&format!("{} resolution", mode)));
    output.push_str(&format!(": {}\n", res.summary()));

    output.push_str(&format!("\n{}\n", colors.green("roots")));
    for root in res.root_names() {
        output.push_str(&format!("  {}\n", root));
    }

    output.push_str(&format!("\n{}\n", colors.green("order")));
    for (i, node) in res.activation_order().enumerate() {
        output.push_str(&format!("  {:>3}. {}\n", i + 1, node.name()));
    }

    if res.summary().unlinked > 0 {
        output.push_str(&format!("\n{}\n", colors.yellow("unlinked")));
        for name in res.unlinked_names() {
            let reasons: Vec<_> = res.blockers(name).iter().map(describe_blocker).collect();
            output.push_str(&format!("  {}  {}\n", name, colors.dim(&reasons.join("; "))));
        }
    }

    output
}

/// JSON report of one resolution, including the full node index
pub fn render_json<N: LinkedNode + Serialize>(res: &Resolution<N>, mode: Mode) -> anyhow::Result<String> {
    let report = ResolveReport {
        mode,
        summary: res.summary(),
        blocked: res
            .unlinked_names()
            .map(|name| BlockedNode {
                name,
                blockers: res.blockers(name),
            })
            .collect(),
        resolution: res,
    };

    let mut json = serde_json::to_string_pretty(&report).context("Failed to serialize resolution")?;
    json.push('\n');
    Ok(json)
}
