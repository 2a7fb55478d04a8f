//! Single-parent tree resolution
//!
//! Every declaration names at most one parent, so the linked result is a
//! forest. Besides the closures, each node learns the root of its chain.

use std::collections::VecDeque;

use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::{debug, trace, warn};

use tether_core::{Declaration, TetherError, TetherResult};

use crate::resolution::{LinkedNode, Resolution};

/// Node of a single-parent tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode<T = ()> {
    name: String,
    /// Declared parent, linked or not
    parent: Option<String>,
    /// Holds the linked parent, if any
    direct_parents: IndexSet<String>,
    root_node: Option<String>,
    children: IndexSet<String>,
    all_ancestors: IndexSet<String>,
    all_descendants: IndexSet<String>,
    payload: T,
}

impl<T> TreeNode<T> {
    fn new(name: String, parent: Option<String>, payload: T) -> Self {
        Self {
            name,
            parent,
            direct_parents: IndexSet::new(),
            root_node: None,
            children: IndexSet::new(),
            all_ancestors: IndexSet::new(),
            all_descendants: IndexSet::new(),
            payload,
        }
    }

    /// Declared parent name
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Linked parent name
    pub fn parent_node(&self) -> Option<&str> {
        self.direct_parents.first().map(String::as_str)
    }

    /// Top of this node's chain; `None` for roots and unlinked nodes
    pub fn root_node(&self) -> Option<&str> {
        self.root_node.as_deref()
    }

    /// Distance from the root of the chain
    pub fn depth(&self) -> usize {
        self.all_ancestors.len()
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl<T> LinkedNode for TreeNode<T> {
    type Payload = T;

    fn name(&self) -> &str {
        &self.name
    }

    fn declared_parents(&self) -> &[String] {
        self.parent.as_slice()
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

impl<T> Resolution<TreeNode<T>> {
    /// Chain from `name` up to its root, `name` first
    pub fn path_to_root(&self, name: &str) -> Vec<&TreeNode<T>> {
        let mut path = Vec::new();
        let mut cursor = self.node(name);

        while let Some(node) = cursor {
            path.push(node);
            cursor = node.parent_node().and_then(|parent| self.node(parent));
        }

        path
    }
}

/// Link a flat list of single-parent declarations into a forest.
///
/// Declarations with more than one required parent keep only the first;
/// optional parents are ignored. Fails only on a repeated name.
#[tracing::instrument(skip_all)]
pub fn resolve<T, I>(declarations: I) -> TetherResult<Resolution<TreeNode<T>>>
where
    I: IntoIterator<Item = Declaration<T>>,
{
    let mut index: IndexMap<String, TreeNode<T>> = IndexMap::new();
    let mut roots = IndexSet::new();
    let mut buckets: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut queue = VecDeque::new();

    // First pass: index everything, queue the roots, bucket the rest by parent
    for decl in declarations {
        // An empty parent name counts as no parent
        let mut parents = decl.parents.into_iter().filter(|parent| !parent.is_empty());
        let parent = parents.next();
        let extra = parents.count();
        if extra > 0 {
            warn!(
                node = %decl.name,
                ignored = extra,
                "Tree declarations take one parent; extra parents ignored"
            );
        }

        let name = match index.entry(decl.name) {
            Entry::Occupied(entry) => {
                return Err(TetherError::DuplicateDeclaration {
                    name: entry.key().clone(),
                })
            },
            Entry::Vacant(entry) => {
                let name = entry.key().clone();
                entry.insert(TreeNode::new(name.clone(), parent.clone(), decl.payload));
                name
            },
        };

        match parent {
            None => {
                roots.insert(name.clone());
                queue.push_back(name);
            },
            Some(parent) => buckets.entry(parent).or_default().push(name),
        }
    }

    debug!(
        nodes = index.len(),
        roots = roots.len(),
        buckets = buckets.len(),
        "Classified tree declarations"
    );

    // Second pass: activate breadth-first from the roots
    let mut order = Vec::with_capacity(index.len());
    while let Some(key) = queue.pop_front() {
        let waiting = buckets.get_mut(&key).map(std::mem::take).unwrap_or_default();
        trace!(node = %key, waiting = waiting.len(), "Activated");

        for child in waiting {
            link(&mut index, &key, &child)?;
            queue.push_back(child);
        }
        order.push(key);
    }

    // Whatever was never drained waited on a missing or cyclic parent
    let unlinked: IndexSet<String> = buckets.into_values().flatten().collect();
    debug!(
        linked = order.len(),
        unlinked = unlinked.len(),
        "Tree resolution finished"
    );

    Ok(Resolution::new(roots, index, unlinked, order))
}

fn link<T>(index: &mut IndexMap<String, TreeNode<T>>, parent: &str, child: &str) -> TetherResult<()> {
    let parent_node = node_mut(index, parent)?;
    parent_node.children.insert(child.to_string());
    let root = parent_node
        .root_node
        .clone()
        .unwrap_or_else(|| parent.to_string());

    // Walk up the chain, nearest ancestor first
    let mut ancestors = IndexSet::new();
    let mut cursor = Some(parent.to_string());
    while let Some(name) = cursor {
        let ancestor = node_mut(index, &name)?;
        ancestor.all_descendants.insert(child.to_string());
        cursor = ancestor.parent_node().map(str::to_string);
        ancestors.insert(name);
    }

    let child_node = node_mut(index, child)?;
    child_node.direct_parents.insert(parent.to_string());
    child_node.root_node = Some(root);
    child_node.all_ancestors = ancestors;

    Ok(())
}

fn node_mut<'a, T>(
    index: &'a mut IndexMap<String, TreeNode<T>>,
    name: &str,
) -> TetherResult<&'a mut TreeNode<T>> {
    index.get_mut(name).ok_or_else(|| TetherError::UnknownNode {
        name: name.to_string(),
    })
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use petgraph::algo::tarjan_scc;
    use petgraph::graph::DiGraph;
    use proptest::prelude::*;
    use std::collections::HashMap;

    /// Up to `n` nodes named `n0..`, each with an optional parent drawn from
    /// a slightly larger name space so some parents are missing.
    fn forest(max: usize) -> impl Strategy<Value = Vec<Declaration>> {
        prop::collection::vec(prop::option::of(0usize..max + 2), 0..max).prop_map(|parents| {
            parents
                .into_iter()
                .enumerate()
                .map(|(i, parent)| {
                    Declaration::new(format!("n{}", i)).with_parents(parent.map(|p| format!("n{}", p)))
                })
                .collect()
        })
    }

    /// Names whose parent chain loops back to themselves
    fn cycle_members(decls: &[Declaration]) -> Vec<String> {
        let mut graph = DiGraph::<&str, ()>::new();
        let indices: HashMap<&str, _> = decls
            .iter()
            .map(|d| (d.name.as_str(), graph.add_node(d.name.as_str())))
            .collect();
        for d in decls {
            if let Some(&from) = d.parents.first().and_then(|p| indices.get(p.as_str())) {
                graph.add_edge(from, indices[d.name.as_str()], ());
            }
        }

        tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .flatten()
            .map(|idx| graph[idx].to_string())
            .collect()
    }

    proptest! {
        #[test]
        fn cycles_stay_unlinked(decls in forest(12)) {
            let members = cycle_members(&decls);
            let res = resolve(decls).unwrap();
            for name in &members {
                prop_assert!(res.is_unlinked(name), "{} sits on a cycle but linked", name);
            }
        }

        #[test]
        fn index_holds_every_declaration(decls in forest(12)) {
            let count = decls.len();
            let res = resolve(decls).unwrap();
            prop_assert_eq!(res.len(), count);
        }

        #[test]
        fn roots_have_no_ancestors(decls in forest(12)) {
            let res = resolve(decls).unwrap();
            for root in res.roots() {
                prop_assert!(root.all_ancestors().is_empty());
                prop_assert!(root.root_node().is_none());
            }
        }

        #[test]
        fn linked_nodes_reach_a_root(decls in forest(12)) {
            let res = resolve(decls).unwrap();
            for node in res.nodes() {
                if res.is_unlinked(node.name()) {
                    prop_assert!(node.all_ancestors().is_empty());
                    prop_assert!(node.all_descendants().is_empty());
                    continue;
                }

                let path = res.path_to_root(node.name());
                let top = path.last().unwrap();
                prop_assert!(res.is_root(top.name()));
                if !res.is_root(node.name()) {
                    prop_assert_eq!(node.root_node(), Some(top.name()));
                }
                prop_assert_eq!(node.depth() + 1, path.len());
            }
        }

        #[test]
        fn edges_are_mirrored(decls in forest(12)) {
            let res = resolve(decls).unwrap();
            for node in res.nodes() {
                for child in node.direct_children() {
                    let child_node = res.node(child).unwrap();
                    prop_assert_eq!(child_node.parent_node(), Some(node.name()));
                    prop_assert!(node.all_descendants().contains(child));
                    prop_assert!(child_node.all_ancestors().contains(node.name()));
                }
                for ancestor in node.all_ancestors() {
                    prop_assert!(res.node(ancestor).unwrap().all_descendants().contains(node.name()));
                }
            }
        }
    }
}
