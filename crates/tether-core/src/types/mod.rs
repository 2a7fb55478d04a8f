//! Core data types for Tether.
//!
//! This module provides the input side of the linker:
//! - Declarations of named items and their parents
//! - Name coercion for the ingest APIs
//! - Duplicate-name policies

pub mod declaration;
pub mod policy;

// Re-export all public types
pub use declaration::{Declaration, IntoNames};
pub use policy::DuplicatePolicy;
