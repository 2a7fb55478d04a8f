//! `tether why` command implementation.
//!
//! Shows where one node sits in the linked result: its parents and both
//! closures, or, for an unlinked node, which required parents held it back.

use anyhow::Context;
use serde::Serialize;

use tether_config::OutputFormat;
use tether_resolver::{Blocker, LinkedNode, Resolution, TreeNode};

use super::{describe_blocker, suggest_similar_name, CommandContext, Linked, Outcome};
use crate::output::colors::ColorSupport;
use crate::ResolveOpts;

/// Everything `tether why` reports about one node
#[derive(Debug, Serialize)]
pub struct Explanation<'a> {
    pub name: &'a str,
    pub linked: bool,
    pub root: bool,
    pub parents: Vec<&'a str>,
    pub ancestors: Vec<&'a str>,
    pub descendants: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blockers: Vec<Blocker>,
    /// Tree mode only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_node: Option<&'a str>,
    /// Tree mode only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
}

/// Execute the `tether why` command
pub async fn execute(name: String, opts: ResolveOpts, ctx: &CommandContext) -> anyhow::Result<Outcome> {
    let loaded = ctx.load(opts.overrides(None)).await?;
    let linked = loaded.link().context("Failed to link declarations")?;

    let explanation = match &linked {
        Linked::Tree(res) => explain_tree(res, &name),
        Linked::Graph(res) => explain(res, &name),
    };

    let Some(explanation) = explanation else {
        ctx.output.error(&format!("No node named '{}' in {}", name, loaded.source.path()));
        if let Some(suggestion) = suggest_similar_name(&name, &linked.names()) {
            ctx.output.info(&format!("Did you mean '{}'?", suggestion));
        }
        return Ok(Outcome::Failure);
    };

    let rendered = match loaded.settings.format {
        OutputFormat::Text => render_text(&explanation, ctx.output.colors()),
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(&explanation).context("Failed to serialize explanation")?;
            json.push('\n');
            json
        },
    };
    ctx.output.print(&rendered);

    Ok(Outcome::Success)
}

/// Explain a node of either engine's result
pub fn explain<'a, N: LinkedNode>(res: &'a Resolution<N>, name: &str) -> Option<Explanation<'a>> {
    let node = res.node(name)?;

    Some(Explanation {
        name: node.name(),
        linked: res.is_linked(name),
        root: res.is_root(name),
        parents: names(node.direct_parents()),
        ancestors: names(node.all_ancestors()),
        descendants: names(node.all_descendants()),
        blockers: res.blockers(name),
        root_node: None,
        depth: None,
    })
}

fn names<'a>(set: impl IntoIterator<Item = &'a String>) -> Vec<&'a str> {
    set.into_iter().map(String::as_str).collect()
}

/// Explain a tree node, adding its root and depth
pub fn explain_tree<'a, T>(res: &'a Resolution<TreeNode<T>>, name: &str) -> Option<Explanation<'a>> {
    let mut explanation = explain(res, name)?;
    if explanation.linked {
        let node = res.node(name)?;
        explanation.root_node = node.root_node();
        explanation.depth = Some(node.depth());
    }
    Some(explanation)
}

pub fn render_text(explanation: &Explanation<'_>, colors: &ColorSupport) -> String {
    let mut output = String::new();

    let state = match (explanation.linked, explanation.root) {
        (true, true) => colors.green("root"),
        (true, false) => colors.green("linked"),
        (false, _) => colors.yellow("unlinked"),
    };
    output.push_str(&format!("{}: {}\n", colors.bold(explanation.name), state));

    if !explanation.linked {
        for blocker in &explanation.blockers {
            output.push_str(&format!("  {}\n", describe_blocker(blocker)));
        }
        return output;
    }

    let list = |names: &[&str]| {
        if names.is_empty() {
            colors.dim("-")
        } else {
            names.join(", ")
        }
    };

    if let Some(root) = explanation.root_node {
        output.push_str(&format!("  {:<12} {}\n", "root", root));
    }
    if let Some(depth) = explanation.depth {
        output.push_str(&format!("  {:<12} {}\n", "depth", depth));
    }
    output.push_str(&format!("  {:<12} {}\n", "parents", list(&explanation.parents)));
    output.push_str(&format!("  {:<12} {}\n", "ancestors", list(&explanation.ancestors)));
    output.push_str(&format!("  {:<12} {}\n", "descendants", list(&explanation.descendants)));

    output
}
