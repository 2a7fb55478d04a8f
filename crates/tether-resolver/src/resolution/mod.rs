//! Resolution snapshot shared by both engines
//!
//! A [`Resolution`] owns every node of one run in a name-keyed arena. Nodes
//! refer to each other by name only, so traversal goes back through the
//! snapshot (`parents_of`, `children_of`, ...).

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// Read access to a linked node, independent of the engine that built it
pub trait LinkedNode {
    /// Attached payload type
    type Payload;

    /// Unique name of the node
    fn name(&self) -> &str;

    /// Required parents as declared, linked or not
    fn declared_parents(&self) -> &[String];

    /// Parents actually linked
    fn direct_parents(&self) -> &IndexSet<String>;

    /// Children actually linked
    fn direct_children(&self) -> &IndexSet<String>;

    /// Transitive closure of `direct_parents`
    fn all_ancestors(&self) -> &IndexSet<String>;

    /// Transitive closure of `direct_children`
    fn all_descendants(&self) -> &IndexSet<String>;

    /// Attached payload
    fn payload(&self) -> &Self::Payload;
}

/// Why a declared required parent did not link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Blocker {
    /// The parent name was never declared
    Missing(String),
    /// The parent was declared but is itself unlinked
    Unlinked(String),
}

/// Immutable result of one resolution run
#[derive(Debug, Clone, Serialize)]
pub struct Resolution<N> {
    roots: IndexSet<String>,
    index: IndexMap<String, N>,
    unlinked: IndexSet<String>,
    order: Vec<String>,
}

/// Node counts of a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub roots: usize,
    pub linked: usize,
    pub unlinked: usize,
}

impl<N> Resolution<N> {
    pub(crate) fn new(
        roots: IndexSet<String>,
        index: IndexMap<String, N>,
        unlinked: IndexSet<String>,
        order: Vec<String>,
    ) -> Self {
        Self {
            roots,
            index,
            unlinked,
            order,
        }
    }

    /// Number of declared nodes, linked or not
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Look up any declared node by name
    pub fn node(&self, name: &str) -> Option<&N> {
        self.index.get(name)
    }

    /// Every declared node, in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.index.values()
    }

    /// The full name index
    pub fn index(&self) -> &IndexMap<String, N> {
        &self.index
    }

    pub fn root_names(&self) -> impl Iterator<Item = &str> {
        self.roots.iter().map(String::as_str)
    }

    pub fn roots(&self) -> impl Iterator<Item = &N> {
        self.lookup(&self.roots)
    }

    pub fn is_root(&self, name: &str) -> bool {
        self.roots.contains(name)
    }

    /// Names of unlinked nodes, grouped by the parent they waited on
    pub fn unlinked_names(&self) -> impl Iterator<Item = &str> {
        self.unlinked.iter().map(String::as_str)
    }

    pub fn unlinked(&self) -> impl Iterator<Item = &N> {
        self.lookup(&self.unlinked)
    }

    pub fn is_unlinked(&self, name: &str) -> bool {
        self.unlinked.contains(name)
    }

    /// Check if `name` was declared and fully linked
    pub fn is_linked(&self, name: &str) -> bool {
        self.index.contains_key(name) && !self.unlinked.contains(name)
    }

    /// Linked nodes in initialization order.
    ///
    /// Every node comes after all of its linked parents.
    pub fn activation_order(&self) -> impl Iterator<Item = &N> {
        self.order.iter().filter_map(move |name| self.index.get(name))
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total: self.index.len(),
            roots: self.roots.len(),
            linked: self.index.len() - self.unlinked.len(),
            unlinked: self.unlinked.len(),
        }
    }

    fn lookup<'a>(&'a self, names: &'a IndexSet<String>) -> impl Iterator<Item = &'a N> + 'a {
        names.iter().filter_map(move |name| self.index.get(name))
    }
}

impl<N: LinkedNode> Resolution<N> {
    /// Linked parents of `name`
    pub fn parents_of<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a N> + 'a {
        self.related(name, N::direct_parents)
    }

    /// Linked children of `name`
    pub fn children_of<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a N> + 'a {
        self.related(name, N::direct_children)
    }

    /// Everything `name` transitively depends on
    pub fn ancestors_of<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a N> + 'a {
        self.related(name, N::all_ancestors)
    }

    /// Everything that transitively depends on `name`
    pub fn descendants_of<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a N> + 'a {
        self.related(name, N::all_descendants)
    }

    /// Check if `dependent` transitively depends on `dependency`
    pub fn depends_on(&self, dependent: &str, dependency: &str) -> bool {
        self.index
            .get(dependent)
            .is_some_and(|node| node.all_ancestors().contains(dependency))
    }

    /// Declared required parents of `name` that kept it from linking.
    ///
    /// Empty for linked nodes and for names that were never declared.
    pub fn blockers(&self, name: &str) -> Vec<Blocker> {
        let Some(node) = self.index.get(name) else {
            return Vec::new();
        };
        if !self.unlinked.contains(name) {
            return Vec::new();
        }

        node.declared_parents()
            .iter()
            .filter_map(|parent| {
                if !self.index.contains_key(parent) {
                    Some(Blocker::Missing(parent.clone()))
                } else if self.unlinked.contains(parent) {
                    Some(Blocker::Unlinked(parent.clone()))
                } else {
                    None
                }
            })
            .collect()
    }

    fn related<'a>(
        &'a self,
        name: &str,
        edges: fn(&N) -> &IndexSet<String>,
    ) -> impl Iterator<Item = &'a N> + 'a {
        self.index
            .get(name)
            .into_iter()
            .flat_map(move |node| edges(node).iter())
            .filter_map(move |related| self.index.get(related))
    }
}

impl<N> Default for Resolution<N> {
    fn default() -> Self {
        Self::new(IndexSet::new(), IndexMap::new(), IndexSet::new(), Vec::new())
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes: {} roots, {} linked, {} unlinked",
            self.total, self.roots, self.linked, self.unlinked
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Stub {
        name: String,
        declared: Vec<String>,
        parents: IndexSet<String>,
        children: IndexSet<String>,
    }

    impl LinkedNode for Stub {
        type Payload = ();

        fn name(&self) -> &str {
            &self.name
        }
        fn declared_parents(&self) -> &[String] {
            &self.declared
        }
        fn direct_parents(&self) -> &IndexSet<String> {
            &self.parents
        }
        fn direct_children(&self) -> &IndexSet<String> {
            &self.children
        }
        fn all_ancestors(&self) -> &IndexSet<String> {
            &self.parents
        }
        fn all_descendants(&self) -> &IndexSet<String> {
            &self.children
        }
        fn payload(&self) -> &() {
            &()
        }
    }

    fn owned<C: FromIterator<String>>(names: &[&str]) -> C {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn stub(name: &str, declared: &[&str], parents: &[&str], children: &[&str]) -> (String, Stub) {
        (
            name.to_string(),
            Stub {
                name: name.to_string(),
                declared: owned(declared),
                parents: owned(parents),
                children: owned(children),
            },
        )
    }

    fn sample() -> Resolution<Stub> {
        let index: IndexMap<_, _> = [
            stub("a", &[], &[], &["b"]),
            stub("b", &["a"], &["a"], &[]),
            stub("c", &["z"], &[], &[]),
            stub("d", &["c", "a"], &[], &[]),
        ]
        .into_iter()
        .collect();

        Resolution::new(
            ["a".to_string()].into_iter().collect(),
            index,
            ["c".to_string(), "d".to_string()].into_iter().collect(),
            vec!["a".to_string(), "b".to_string()],
        )
    }

    #[test]
    fn test_empty_resolution() {
        let res: Resolution<Stub> = Resolution::default();
        assert!(res.is_empty());
        assert_eq!(res.roots().count(), 0);
        assert_eq!(res.unlinked().count(), 0);
        assert_eq!(res.summary().total, 0);
    }

    #[test]
    fn test_lookups() {
        let res = sample();

        assert_eq!(res.len(), 4);
        assert!(res.is_root("a"));
        assert!(!res.is_root("b"));
        assert!(res.is_linked("b"));
        assert!(!res.is_linked("c"));
        assert!(!res.is_linked("nope"));
        assert!(res.is_unlinked("d"));
        assert_eq!(res.unlinked_names().collect::<Vec<_>>(), vec!["c", "d"]);
    }

    #[test]
    fn test_traversal() {
        let res = sample();

        let children: Vec<_> = res.children_of("a").map(|n| n.name()).collect();
        assert_eq!(children, vec!["b"]);
        let parents: Vec<_> = res.parents_of("b").map(|n| n.name()).collect();
        assert_eq!(parents, vec!["a"]);
        assert_eq!(res.parents_of("missing").count(), 0);

        assert!(res.depends_on("b", "a"));
        assert!(!res.depends_on("a", "b"));
    }

    #[test]
    fn test_blockers() {
        let res = sample();

        assert_eq!(res.blockers("c"), vec![Blocker::Missing("z".to_string())]);
        assert_eq!(res.blockers("d"), vec![Blocker::Unlinked("c".to_string())]);
        assert!(res.blockers("b").is_empty());
        assert!(res.blockers("missing").is_empty());
    }

    #[test]
    fn test_summary() {
        let summary = sample().summary();
        assert_eq!(
            summary,
            Summary {
                total: 4,
                roots: 1,
                linked: 2,
                unlinked: 2
            }
        );
        assert_eq!(summary.to_string(), "4 nodes: 1 roots, 2 linked, 2 unlinked");
    }
}
