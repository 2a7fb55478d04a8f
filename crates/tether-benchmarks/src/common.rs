//! Common utilities for benchmarks

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};
use tether_core::Declaration;

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

fn name(i: usize) -> String {
    format!("n{}", i)
}

/// `n0 <- n1 <- ... <- n{len-1}`, declared leaf first
pub fn chain(len: usize) -> Vec<Declaration> {
    (0..len)
        .rev()
        .map(|i| {
            let decl = Declaration::new(name(i));
            if i == 0 {
                decl
            } else {
                decl.with_parent(name(i - 1))
            }
        })
        .collect()
}

/// One root with `len - 1` direct children
pub fn fan_out(len: usize) -> Vec<Declaration> {
    (0..len)
        .map(|i| {
            let decl = Declaration::new(name(i));
            if i == 0 {
                decl
            } else {
                decl.with_parent(name(0))
            }
        })
        .collect()
}

/// Layers of `width` nodes; each node requires two nodes of the layer above
/// and optionally follows a third.
pub fn layered_dag(len: usize, width: usize) -> Vec<Declaration> {
    let width = width.max(1);
    (0..len)
        .map(|i| {
            let decl = Declaration::new(name(i));
            if i < width {
                return decl;
            }
            let above = (i / width - 1) * width;
            let column = i % width;
            decl.with_parents([name(above + column), name(above + (column + 1) % width)])
                .with_optional_parents(name(above + (column + 2) % width))
        })
        .rev()
        .collect()
}

/// A fan-out where every fourth node waits on a missing parent and every
/// tenth pair forms a cycle
pub fn with_unlinked(len: usize) -> Vec<Declaration> {
    (0..len)
        .map(|i| {
            let decl = Declaration::new(name(i));
            match i {
                0 => decl,
                i if i % 4 == 0 => decl.with_parent(format!("missing{}", i)),
                i if i % 10 == 1 && i + 1 < len => decl.with_parent(name(i + 1)),
                i if i % 10 == 2 => decl.with_parent(name(i - 1)),
                _ => decl.with_parent(name(0)),
            }
        })
        .collect()
}

/// TOML manifest text for `declarations`
pub fn manifest_toml(declarations: &[Declaration]) -> String {
    let mut toml = String::from("mode = \"graph\"\n");
    for decl in declarations {
        toml.push_str(&format!("\n[[node]]\nname = \"{}\"\n", decl.name));
        if !decl.parents.is_empty() {
            let parents: Vec<_> = decl.parents.iter().map(|p| format!("\"{}\"", p)).collect();
            toml.push_str(&format!("parents = [{}]\n", parents.join(", ")));
        }
        if !decl.optional_parents.is_empty() {
            let optional: Vec<_> = decl.optional_parents.iter().map(|p| format!("\"{}\"", p)).collect();
            toml.push_str(&format!("optional = [{}]\n", optional.join(", ")));
        }
    }
    toml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generators_link_as_expected() {
        let res = tether_resolver::graph::resolve(chain(50)).unwrap();
        assert_eq!(res.summary().linked, 50);
        assert_eq!(res.root_names().collect::<Vec<_>>(), vec!["n0"]);

        let res = tether_resolver::graph::resolve(layered_dag(40, 8)).unwrap();
        assert_eq!(res.summary().unlinked, 0);
        assert_eq!(res.summary().roots, 8);

        let res = tether_resolver::tree::resolve(fan_out(20)).unwrap();
        assert_eq!(res.summary().linked, 20);

        let res = tether_resolver::graph::resolve(with_unlinked(100)).unwrap();
        assert!(res.summary().unlinked > 0);
        assert!(res.summary().linked > 1);
    }

    #[test]
    fn test_manifest_round_trips_through_parser() {
        let decls = layered_dag(20, 4);
        let manifest = tether_config::toml::parse_manifest(&manifest_toml(&decls)).unwrap();
        assert_eq!(manifest.into_declarations().len(), decls.len());
    }
}
