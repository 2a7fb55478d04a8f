//! Error types and result aliases for Tether operations.
//!
//! Missing and cyclic parents are never errors: the resolver reports them as
//! unlinked nodes. The variants here cover what can actually go wrong around
//! the engine: ambiguous input, manifests and I/O.

use thiserror::Error;

/// Unified error type for all Tether operations
#[derive(Error, Debug)]
pub enum TetherError {
    // Resolution errors
    #[error("Duplicate declaration: '{name}' was declared more than once")]
    DuplicateDeclaration { name: String },

    #[error("Node '{name}' is missing from the resolution index")]
    UnknownNode { name: String },

    #[error("Linked graph contains a cycle through '{name}'")]
    LinkedCycle { name: String },

    // Manifest errors
    #[error("Failed to parse {path}: {message}")]
    ManifestParse { path: String, message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for Tether operations
pub type TetherResult<T> = Result<T, TetherError>;

impl TetherError {
    /// Create an IO error from std::io::Error
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a validation error for a named configuration field
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TetherError::Io { .. })
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            TetherError::DuplicateDeclaration { .. } => {
                Some("Give every declaration a unique name, or pick a duplicate policy that keeps one of them")
            },
            TetherError::UnknownNode { .. } | TetherError::LinkedCycle { .. } => {
                Some("This is a bug in the resolver; please report it with the input that triggered it")
            },
            TetherError::ManifestParse { .. } => {
                Some("Check the manifest syntax; every node needs a `name` and optional `parents` list")
            },
            TetherError::ConfigValidation { .. } => {
                Some("Fix the reported field in the manifest or in ~/.config/tether/config.toml")
            },
            _ => None,
        }
    }
}
