//! Multi-parent dependency graph resolution
//!
//! Each declaration may require any number of parents and may name optional
//! parents that are linked only when present. The linked result is a DAG
//! whose ancestor and descendant sets are transitively closed.
//!
//! A node is linked once the last of its required parents has been
//! activated, so its parents' closures are already complete when it merges
//! them. Required-parent cycles never reach the activation queue and the
//! finished edge relation stays acyclic; optional edges that would close a
//! cycle are skipped.

use std::collections::{HashMap, VecDeque};

use indexmap::{IndexMap, IndexSet};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use tracing::{debug, trace};

use tether_core::{Declaration, TetherError, TetherResult};

use crate::resolution::{LinkedNode, Resolution};

/// Node of a multi-parent dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepNode<T = ()> {
    name: String,
    /// Declared required parents, deduplicated
    parents: Vec<String>,
    /// Declared optional parents
    optional_parents: Vec<String>,
    direct_parents: IndexSet<String>,
    children: IndexSet<String>,
    all_ancestors: IndexSet<String>,
    all_descendants: IndexSet<String>,
    payload: T,
}

impl<T> DepNode<T> {
    fn new(name: String, parents: Vec<String>, optional_parents: Vec<String>, payload: T) -> Self {
        Self {
            name,
            parents,
            optional_parents,
            direct_parents: IndexSet::new(),
            children: IndexSet::new(),
            all_ancestors: IndexSet::new(),
            all_descendants: IndexSet::new(),
            payload,
        }
    }

    pub fn declared_optional_parents(&self) -> &[String] {
        &self.optional_parents
    }

    /// Check if `parent` was linked through an optional declaration only
    pub fn is_optional_edge(&self, parent: &str) -> bool {
        self.direct_parents.contains(parent) && !self.parents.iter().any(|p| p == parent)
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl<T> LinkedNode for DepNode<T> {
    type Payload = T;

    fn name(&self) -> &str {
        &self.name
    }

    fn declared_parents(&self) -> &[String] {
        &self.parents
    }

    fn direct_parents(&self) -> &IndexSet<String> {
        &self.direct_parents
    }

    fn direct_children(&self) -> &IndexSet<String> {
        &self.children
    }

    fn all_ancestors(&self) -> &IndexSet<String> {
        &self.all_ancestors
    }

    fn all_descendants(&self) -> &IndexSet<String> {
        &self.all_descendants
    }

    fn payload(&self) -> &T {
        &self.payload
    }
}

/// Link a flat list of multi-parent declarations into a DAG.
///
/// Missing and cyclic required parents leave the node unlinked; missing
/// optional parents are ignored. Fails only on a repeated name.
#[tracing::instrument(skip_all)]
pub fn resolve<T, I>(declarations: I) -> TetherResult<Resolution<DepNode<T>>>
where
    I: IntoIterator<Item = Declaration<T>>,
{
    let mut index: IndexMap<String, DepNode<T>> = IndexMap::new();
    let mut roots = IndexSet::new();
    let mut buckets: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut pending: HashMap<String, usize> = HashMap::new();
    let mut queue = VecDeque::new();

    // First pass: index everything, queue the roots, bucket the rest by each parent
    for decl in declarations {
        let Declaration {
            name,
            parents,
            optional_parents,
            payload,
        } = decl;

        if index.contains_key(&name) {
            return Err(TetherError::DuplicateDeclaration { name });
        }

        let parents: Vec<String> = parents
            .into_iter()
            .filter(|parent| !parent.is_empty())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        if parents.is_empty() {
            roots.insert(name.clone());
            queue.push_back(name.clone());
        } else {
            for parent in &parents {
                buckets.entry(parent.clone()).or_default().push(name.clone());
            }
            pending.insert(name.clone(), parents.len());
        }

        index.insert(
            name.clone(),
            DepNode::new(name, parents, optional_parents, payload),
        );
    }

    debug!(
        nodes = index.len(),
        roots = roots.len(),
        buckets = buckets.len(),
        "Classified graph declarations"
    );

    // Second pass: activate breadth-first, linking a node once all of its
    // required parents are active
    let mut activated = Vec::with_capacity(index.len());
    while let Some(key) = queue.pop_front() {
        let waiting = buckets.get_mut(&key).map(std::mem::take).unwrap_or_default();
        trace!(node = %key, waiting = waiting.len(), "Activated");

        for child in waiting {
            let remaining = pending.get_mut(&child).ok_or_else(|| unknown(&child))?;
            *remaining -= 1;
            if *remaining > 0 {
                continue;
            }

            let parents = node(&index, &child)?.parents.clone();
            for parent in &parents {
                link(&mut index, parent, &child)?;
            }
            queue.push_back(child);
        }
        activated.push(key);
    }

    let unlinked: IndexSet<String> = buckets.into_values().flatten().collect();

    // Third pass: optional edges between linked nodes
    let mut optional_edges = 0usize;
    let names: Vec<String> = index.keys().cloned().collect();
    for name in &names {
        if unlinked.contains(name) {
            continue;
        }

        let optional = node(&index, name)?.optional_parents.clone();
        for parent in &optional {
            if !index.contains_key(parent) {
                trace!(node = %name, parent = %parent, "Optional parent not declared");
                continue;
            }
            if unlinked.contains(parent) {
                trace!(node = %name, parent = %parent, "Optional parent is unlinked");
                continue;
            }

            let current = node(&index, name)?;
            if current.direct_parents.contains(parent) {
                continue;
            }
            if parent == name || current.all_descendants.contains(parent) {
                debug!(node = %name, parent = %parent, "Skipping optional edge that would close a cycle");
                continue;
            }

            link(&mut index, parent, name)?;
            optional_edges += 1;
        }
    }

    // A root that picked up an optional parent no longer starts a chain
    roots.retain(|root| {
        index
            .get(root)
            .is_some_and(|node| node.direct_parents.is_empty())
    });

    let order = initialization_order(&index, &activated)?;
    debug!(
        linked = order.len(),
        unlinked = unlinked.len(),
        optional_edges,
        "Graph resolution finished"
    );

    Ok(Resolution::new(roots, index, unlinked, order))
}

/// Add the edge `parent -> child` and keep both closures transitive.
///
/// Everything at or above `parent` gains everything at or below `child` as a
/// descendant, and the reverse for ancestors.
fn link<T>(index: &mut IndexMap<String, DepNode<T>>, parent: &str, child: &str) -> TetherResult<()> {
    let parent_node = node_mut(index, parent)?;
    parent_node.children.insert(child.to_string());
    let upper: Vec<String> = std::iter::once(parent.to_string())
        .chain(parent_node.all_ancestors.iter().cloned())
        .collect();

    let child_node = node_mut(index, child)?;
    child_node.direct_parents.insert(parent.to_string());
    let lower: Vec<String> = std::iter::once(child.to_string())
        .chain(child_node.all_descendants.iter().cloned())
        .collect();

    for name in &upper {
        node_mut(index, name)?
            .all_descendants
            .extend(lower.iter().cloned());
    }
    for name in &lower {
        node_mut(index, name)?
            .all_ancestors
            .extend(upper.iter().cloned());
    }

    Ok(())
}

/// Linked nodes ordered so that every node follows all of its parents.
///
/// Nodes enter the graph in activation order. Required edges alone never
/// reorder them; optional edges move a child below its new parent.
fn initialization_order<T>(
    index: &IndexMap<String, DepNode<T>>,
    activated: &[String],
) -> TetherResult<Vec<String>> {
    let mut graph: DiGraph<&str, ()> = DiGraph::with_capacity(activated.len(), activated.len());
    let mut positions: HashMap<&str, NodeIndex> = HashMap::with_capacity(activated.len());
    for name in activated {
        positions.insert(name.as_str(), graph.add_node(name.as_str()));
    }

    for name in activated {
        let child = positions[name.as_str()];
        for parent in &node(index, name)?.direct_parents {
            let parent = positions.get(parent.as_str()).ok_or_else(|| unknown(parent))?;
            graph.add_edge(*parent, child, ());
        }
    }

    let sorted = toposort(&graph, None).map_err(|cycle| TetherError::LinkedCycle {
        name: graph[cycle.node_id()].to_string(),
    })?;

    Ok(sorted.into_iter().map(|idx| graph[idx].to_string()).collect())
}

fn node<'a, T>(index: &'a IndexMap<String, DepNode<T>>, name: &str) -> TetherResult<&'a DepNode<T>> {
    index.get(name).ok_or_else(|| unknown(name))
}

fn node_mut<'a, T>(
    index: &'a mut IndexMap<String, DepNode<T>>,
    name: &str,
) -> TetherResult<&'a mut DepNode<T>> {
    index.get_mut(name).ok_or_else(|| unknown(name))
}

fn unknown(name: &str) -> TetherError {
    TetherError::UnknownNode {
        name: name.to_string(),
    }
}
