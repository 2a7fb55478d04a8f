//! End-to-end multi-parent resolution over a mixed graph.
//!
//! ```text
//!           H
//!          / \
//!         E   \
//!        /|\   \
//!       | | D   G
//!       | | |\ /|         K
//!       |  \| X |         |
//!       A   B  C  F   I   J
//! ```
//!
//! with L (missing parent) and M, N (a 2-cycle) left unlinked.

use tether_resolver::{DepNode, DepResolver, LinkedNode, Resolution};

fn build() -> Resolution<DepNode> {
    let deps = DepResolver::new();
    deps.add("a", (), (), ());
    deps.add("b", (), (), ());
    deps.add("c", (), (), ());
    deps.add("d", ["b", "c"], (), ());
    deps.add("e", ["a", "b", "d"], (), ());
    deps.add("f", (), (), ());
    deps.add("g", ["c", "f"], (), ());
    deps.add("h", ["e", "g"], (), ());
    deps.add("i", (), (), ());
    deps.add("j", (), (), ());
    deps.add("k", "j", (), ());
    deps.add("l", "z", (), ());
    deps.add("m", "n", (), ());
    deps.add("n", "m", (), ());
    deps.build().unwrap()
}

fn sorted<'a>(names: impl IntoIterator<Item = &'a String>) -> Vec<&'a str> {
    let mut names: Vec<_> = names.into_iter().map(String::as_str).collect();
    names.sort_unstable();
    names
}

#[test]
fn roots() {
    let res = build();
    let mut roots: Vec<_> = res.root_names().collect();
    roots.sort_unstable();
    assert_eq!(roots, vec!["a", "b", "c", "f", "i", "j"]);
}

#[test]
fn unlinked_nodes() {
    let res = build();
    assert_eq!(res.unlinked_names().collect::<Vec<_>>(), vec!["l", "m", "n"]);

    for name in ["l", "m", "n"] {
        let node = res.node(name).unwrap();
        assert!(node.direct_parents().is_empty());
        assert!(node.direct_children().is_empty());
        assert!(node.all_ancestors().is_empty());
        assert!(node.all_descendants().is_empty());
    }
}

#[test]
fn index_has_every_declaration() {
    let res = build();
    assert_eq!(res.len(), 14);
    assert!(res.node("z").is_none());
}

#[test]
fn direct_parents() {
    let res = build();
    let parents = |name| sorted(res.node(name).unwrap().direct_parents());

    for root in ["a", "b", "c", "f", "i", "j"] {
        assert!(parents(root).is_empty(), "{} should have no parents", root);
    }
    assert_eq!(parents("d"), vec!["b", "c"]);
    assert_eq!(parents("e"), vec!["a", "b", "d"]);
    assert_eq!(parents("g"), vec!["c", "f"]);
    assert_eq!(parents("h"), vec!["e", "g"]);
    assert_eq!(parents("k"), vec!["j"]);
}

#[test]
fn direct_children() {
    let res = build();
    let children = |name| sorted(res.node(name).unwrap().direct_children());

    assert_eq!(children("a"), vec!["e"]);
    assert_eq!(children("b"), vec!["d", "e"]);
    assert_eq!(children("c"), vec!["d", "g"]);
    assert_eq!(children("d"), vec!["e"]);
    assert_eq!(children("e"), vec!["h"]);
    assert_eq!(children("f"), vec!["g"]);
    assert_eq!(children("g"), vec!["h"]);
    assert_eq!(children("j"), vec!["k"]);
    assert!(children("h").is_empty());
    assert!(children("i").is_empty());
    assert!(children("k").is_empty());
}

#[test]
fn all_ancestors() {
    let res = build();
    let ancestors = |name| sorted(res.node(name).unwrap().all_ancestors());

    assert_eq!(ancestors("d"), vec!["b", "c"]);
    assert_eq!(ancestors("e"), vec!["a", "b", "c", "d"]);
    assert_eq!(ancestors("g"), vec!["c", "f"]);
    assert_eq!(ancestors("h"), vec!["a", "b", "c", "d", "e", "f", "g"]);
    assert_eq!(ancestors("k"), vec!["j"]);
    assert!(ancestors("i").is_empty());
}

#[test]
fn all_descendants() {
    let res = build();
    let descendants = |name| sorted(res.node(name).unwrap().all_descendants());

    assert_eq!(descendants("a"), vec!["e", "h"]);
    assert_eq!(descendants("b"), vec!["d", "e", "h"]);
    assert_eq!(descendants("c"), vec!["d", "e", "g", "h"]);
    assert_eq!(descendants("d"), vec!["e", "h"]);
    assert_eq!(descendants("e"), vec!["h"]);
    assert_eq!(descendants("f"), vec!["g", "h"]);
    assert_eq!(descendants("g"), vec!["h"]);
    assert_eq!(descendants("j"), vec!["k"]);
    assert!(descendants("h").is_empty());
}

#[test]
fn traversal_through_the_index() {
    let res = build();

    let h = res
        .children_of("c")
        .find(|n| n.name() == "d")
        .and_then(|d| res.children_of(d.name()).find(|n| n.name() == "e"))
        .and_then(|e| res.children_of(e.name()).find(|n| n.name() == "h"));
    assert_eq!(h.map(|n| n.name()), Some("h"));

    let b = res
        .parents_of("h")
        .find(|n| n.name() == "e")
        .and_then(|e| res.parents_of(e.name()).find(|n| n.name() == "d"))
        .and_then(|d| res.parents_of(d.name()).find(|n| n.name() == "b"));
    assert_eq!(b.map(|n| n.name()), Some("b"));
}

#[test]
fn activation_order_respects_parents() {
    let res = build();
    let order: Vec<_> = res.activation_order().map(|n| n.name()).collect();

    assert_eq!(order.len(), 11);
    for name in &order {
        let pos = order.iter().position(|n| n == name).unwrap();
        for parent in res.node(name).unwrap().direct_parents() {
            let parent_pos = order.iter().position(|n| *n == parent.as_str()).unwrap();
            assert!(parent_pos < pos, "{} must come before {}", parent, name);
        }
    }
}

#[test]
fn blockers_explain_unlinked_nodes() {
    use tether_resolver::Blocker;

    let res = build();
    assert_eq!(res.blockers("l"), vec![Blocker::Missing("z".to_string())]);
    assert_eq!(res.blockers("m"), vec![Blocker::Unlinked("n".to_string())]);
    assert!(res.blockers("h").is_empty());
}
