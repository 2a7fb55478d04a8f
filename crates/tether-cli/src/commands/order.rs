//! `tether order` command implementation.

use anyhow::Context;

use tether_config::OutputFormat;
use tether_resolver::{LinkedNode, Resolution};

use super::{CommandContext, Linked, Outcome};
use crate::ResolveOpts;

/// Execute the `tether order` command
pub async fn execute(opts: ResolveOpts, ctx: &CommandContext) -> anyhow::Result<Outcome> {
    let loaded = ctx.load(opts.overrides(None)).await?;
    let linked = loaded.link().context("Failed to link declarations")?;

    let names = match &linked {
        Linked::Tree(res) => order_names(res),
        Linked::Graph(res) => order_names(res),
    };

    let rendered: String = match loaded.settings.format {
        OutputFormat::Text => names.iter().map(|name| format!("{}\n", name)).collect(),
        OutputFormat::Json => {
            let mut json = serde_json::to_string(&names).context("Failed to serialize order")?;
            json.push('\n');
            json
        },
    };
    ctx.output.print(&rendered);

    Ok(Outcome::Success)
}

/// Linked names, every one after all of its parents
pub fn order_names<N: LinkedNode>(res: &Resolution<N>) -> Vec<&str> {
    res.activation_order().map(LinkedNode::name).collect()
}
