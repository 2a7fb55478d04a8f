//! Name utilities for declarations.
//!
//! Names are opaque keys to the resolver; these helpers exist for the
//! surfaces that accept names from users (manifests, CLI).

use crate::error::{TetherError, TetherResult};
use std::collections::HashSet;

/// Check if a name is usable as a node key
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
}

/// Validate a node name, naming the offending field on failure
pub fn validate_name(field: &str, name: &str) -> TetherResult<()> {
    if name.is_empty() {
        return Err(TetherError::validation(field, "name must not be empty"));
    }

    if !is_valid_name(name) {
        return Err(TetherError::validation(
            field,
            format!(
                "invalid name '{}': names may not contain whitespace or control characters",
                name.escape_debug()
            ),
        ));
    }

    Ok(())
}

/// Names that occur more than once, in order of their second occurrence
pub fn find_duplicates<'a, I>(names: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();

    for name in names {
        if !seen.insert(name) && reported.insert(name) {
            duplicates.push(name);
        }
    }

    duplicates
}
