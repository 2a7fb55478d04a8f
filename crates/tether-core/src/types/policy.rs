//! How a build treats names declared more than once.

use crate::types::Declaration;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Duplicate-name handling applied before resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Fail the build with `TetherError::DuplicateDeclaration`
    #[default]
    Reject,
    /// Keep the first declaration of each name
    KeepFirst,
    /// Keep the last declaration of each name, at its own position
    KeepLast,
}

impl DuplicatePolicy {
    /// Drop repeated names according to this policy.
    ///
    /// `Reject` leaves the list untouched so the resolver can report the
    /// first repeated name.
    pub fn apply<T>(self, declarations: Vec<Declaration<T>>) -> Vec<Declaration<T>> {
        match self {
            DuplicatePolicy::Reject => declarations,
            DuplicatePolicy::KeepFirst => {
                let mut seen = HashSet::new();
                declarations
                    .into_iter()
                    .filter(|decl| seen.insert(decl.name.clone()))
                    .collect()
            },
            DuplicatePolicy::KeepLast => {
                let mut seen = HashSet::new();
                let mut kept: Vec<_> = declarations
                    .into_iter()
                    .rev()
                    .filter(|decl| seen.insert(decl.name.clone()))
                    .collect();
                kept.reverse();
                kept
            },
        }
    }
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicatePolicy::Reject => "reject",
            DuplicatePolicy::KeepFirst => "keep-first",
            DuplicatePolicy::KeepLast => "keep-last",
        }
    }
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reject" => Ok(DuplicatePolicy::Reject),
            "keep-first" => Ok(DuplicatePolicy::KeepFirst),
            "keep-last" => Ok(DuplicatePolicy::KeepLast),
            other => Err(format!(
                "unknown duplicate policy '{}', expected reject, keep-first or keep-last",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decls() -> Vec<Declaration<u8>> {
        vec![
            Declaration::with_payload("a", 1),
            Declaration::with_payload("b", 2),
            Declaration::with_payload("a", 3),
            Declaration::with_payload("c", 4),
        ]
    }

    fn payloads(decls: &[Declaration<u8>]) -> Vec<(&str, u8)> {
        decls.iter().map(|d| (d.name.as_str(), d.payload)).collect()
    }

    #[test]
    fn test_reject_keeps_everything() {
        let kept = DuplicatePolicy::Reject.apply(decls());
        assert_eq!(kept.len(), 4);
    }

    #[test]
    fn test_keep_first() {
        let kept = DuplicatePolicy::KeepFirst.apply(decls());
        assert_eq!(payloads(&kept), vec![("a", 1), ("b", 2), ("c", 4)]);
    }

    #[test]
    fn test_keep_last() {
        let kept = DuplicatePolicy::KeepLast.apply(decls());
        assert_eq!(payloads(&kept), vec![("b", 2), ("a", 3), ("c", 4)]);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("keep-last".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::KeepLast);
        assert!("newest".parse::<DuplicatePolicy>().is_err());
        assert_eq!(DuplicatePolicy::KeepFirst.to_string(), "keep-first");
    }
}
