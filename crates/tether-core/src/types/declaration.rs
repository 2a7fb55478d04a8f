//! Declaration types.
//!
//! A declaration names one item, the items it requires, the items it would
//! like to follow when present, and an opaque payload the linker never reads.

use serde::{Deserialize, Serialize};

/// Caller-supplied record for one item, prior to resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration<T = ()> {
    /// Unique name of this item
    pub name: String,
    /// Required parents; empty makes this a root candidate
    #[serde(default)]
    pub parents: Vec<String>,
    /// Parents linked only when they exist (graph resolution only)
    #[serde(default)]
    pub optional_parents: Vec<String>,
    /// Attached value, passed through untouched
    pub payload: T,
}

impl<T: Default> Declaration<T> {
    /// Create a root declaration with a default payload
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_payload(name, T::default())
    }
}

impl<T> Declaration<T> {
    /// Create a root declaration carrying `payload`
    pub fn with_payload(name: impl Into<String>, payload: T) -> Self {
        Self {
            name: name.into(),
            parents: Vec::new(),
            optional_parents: Vec::new(),
            payload,
        }
    }

    /// Add one required parent
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Add required parents
    pub fn with_parents(mut self, parents: impl IntoNames) -> Self {
        self.parents.extend(parents.into_names());
        self
    }

    /// Add optional parents
    pub fn with_optional_parents(mut self, parents: impl IntoNames) -> Self {
        self.optional_parents.extend(parents.into_names());
        self
    }

    /// Check if this declaration has no required parents
    pub fn is_root_candidate(&self) -> bool {
        self.parents.is_empty()
    }

    /// Replace the payload, keeping the name and parents
    pub fn map_payload<U>(self, f: impl FnOnce(T) -> U) -> Declaration<U> {
        Declaration {
            name: self.name,
            parents: self.parents,
            optional_parents: self.optional_parents,
            payload: f(self.payload),
        }
    }
}

/// Conversion into a list of names.
///
/// Lets the ingest APIs take a single name as well as a list of names:
/// `"a"`, `["a", "b"]`, `vec![name]`, `Some("a")` and `()` for none.
pub trait IntoNames {
    fn into_names(self) -> Vec<String>;
}

impl IntoNames for () {
    fn into_names(self) -> Vec<String> {
        Vec::new()
    }
}

impl IntoNames for &str {
    fn into_names(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoNames for String {
    fn into_names(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoNames for &String {
    fn into_names(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl<S: Into<String>> IntoNames for Option<S> {
    fn into_names(self) -> Vec<String> {
        self.map(|name| vec![name.into()]).unwrap_or_default()
    }
}

impl<S: Into<String>> IntoNames for Vec<S> {
    fn into_names(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Into<String>, const N: usize> IntoNames for [S; N] {
    fn into_names(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Into<String> + Clone> IntoNames for &[S] {
    fn into_names(self) -> Vec<String> {
        self.iter().cloned().map(Into::into).collect()
    }
}
