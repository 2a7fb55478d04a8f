//! Utility functions and helpers.
//!
//! Common functionality used across multiple Tether crates.

pub mod name;

// Re-export commonly used utilities
pub use name::{find_duplicates, is_valid_name, validate_name};
