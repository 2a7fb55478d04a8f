//! # tether-core
//!
//! Core types and utilities shared across all Tether crates.
//!
//! This crate provides:
//! - `Declaration`, the caller-supplied record naming one item and its parents
//! - `TetherError` enum for unified error handling
//! - `DuplicatePolicy` for repeated names
//! - Name validation and duplicate detection helpers
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Declaration, IntoNames)
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{TetherError, TetherResult};
pub use types::{Declaration, DuplicatePolicy, IntoNames};
