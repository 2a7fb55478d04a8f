//! Dependency-graph linker for Tether
//!
//! This crate turns a flat, unordered list of declarations into a linked graph
//! with direct edges, transitive closures, a root set and the list of nodes
//! whose parents could not be satisfied.
//!
//! Two engines share the same two-pass worklist shape:
//! - [`tree`]: every node has at most one parent, producing a forest
//! - [`graph`]: nodes may have many required and optional parents, producing a DAG

pub mod graph;
pub mod ingest;
pub mod resolution;
pub mod tree;

// Re-export main types
pub use graph::DepNode;
pub use ingest::{DepResolver, TreeResolver};
pub use resolution::{Blocker, LinkedNode, Resolution, Summary};
pub use tree::TreeNode;

pub use tether_core::{Declaration, DuplicatePolicy, TetherError, TetherResult};
