//! Ingest registrars
//!
//! Accumulate declarations one at a time, then build a fresh resolution from
//! whatever is pending. Registration takes `&self`, so a registrar can be
//! shared across threads; `build` reads the pending list under the same lock
//! and never sees a half-added declaration.

use parking_lot::Mutex;
use tracing::debug;

use tether_core::{Declaration, DuplicatePolicy, IntoNames, TetherResult};

use crate::graph::{self, DepNode};
use crate::resolution::Resolution;
use crate::tree::{self, TreeNode};

/// Registrar for single-parent trees
#[derive(Debug)]
pub struct TreeResolver<T = ()> {
    pending: Mutex<Vec<Declaration<T>>>,
    policy: DuplicatePolicy,
}

/// Registrar for multi-parent dependency graphs
#[derive(Debug)]
pub struct DepResolver<T = ()> {
    pending: Mutex<Vec<Declaration<T>>>,
    policy: DuplicatePolicy,
}

impl<T> TreeResolver<T> {
    /// Create an empty registrar that rejects duplicate names
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::default())
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            policy,
        }
    }

    /// Add one item with an optional parent
    pub fn add(&self, name: impl Into<String>, parent: Option<&str>, payload: T) {
        self.add_declaration(Declaration::with_payload(name, payload).with_parents(parent));
    }

    pub fn add_declaration(&self, declaration: Declaration<T>) {
        self.pending.lock().push(declaration);
    }

    pub fn extend(&self, declarations: impl IntoIterator<Item = Declaration<T>>) {
        self.pending.lock().extend(declarations);
    }

    /// Drop every pending declaration; earlier results are unaffected
    pub fn clear(&self) {
        self.pending.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Resolve the pending declarations, consuming the registrar
    pub fn into_resolution(self) -> TetherResult<Resolution<TreeNode<T>>> {
        tree::resolve(self.policy.apply(self.pending.into_inner()))
    }
}

impl<T: Clone> TreeResolver<T> {
    /// Resolve a snapshot of the pending declarations
    pub fn build(&self) -> TetherResult<Resolution<TreeNode<T>>> {
        let snapshot = self.pending.lock().clone();
        debug!(declarations = snapshot.len(), "Building tree");
        tree::resolve(self.policy.apply(snapshot))
    }
}

impl<T> DepResolver<T> {
    /// Create an empty registrar that rejects duplicate names
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::default())
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            policy,
        }
    }

    /// Add one item.
    ///
    /// `parents` and `optional_parents` take a single name, a list of names,
    /// or `()` for none.
    pub fn add(
        &self,
        name: impl Into<String>,
        parents: impl IntoNames,
        optional_parents: impl IntoNames,
        payload: T,
    ) {
        self.add_declaration(
            Declaration::with_payload(name, payload)
                .with_parents(parents)
                .with_optional_parents(optional_parents),
        );
    }

    pub fn add_declaration(&self, declaration: Declaration<T>) {
        self.pending.lock().push(declaration);
    }

    pub fn extend(&self, declarations: impl IntoIterator<Item = Declaration<T>>) {
        self.pending.lock().extend(declarations);
    }

    /// Drop every pending declaration; earlier results are unaffected
    pub fn clear(&self) {
        self.pending.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Resolve the pending declarations, consuming the registrar
    pub fn into_resolution(self) -> TetherResult<Resolution<DepNode<T>>> {
        graph::resolve(self.policy.apply(self.pending.into_inner()))
    }
}

impl<T: Clone> DepResolver<T> {
    /// Resolve a snapshot of the pending declarations
    pub fn build(&self) -> TetherResult<Resolution<DepNode<T>>> {
        let snapshot = self.pending.lock().clone();
        debug!(declarations = snapshot.len(), "Building graph");
        graph::resolve(self.policy.apply(snapshot))
    }
}

impl<T> Default for TreeResolver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Default for DepResolver<T> {
    fn default() -> Self {
        Self::new()
    }
}
