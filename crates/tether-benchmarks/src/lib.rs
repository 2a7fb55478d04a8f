//! Tether benchmarking suite
//!
//! Benchmarks for both resolution engines, concurrent ingestion and manifest
//! parsing, plus the input generators they share.

pub mod common;

pub use common::*;
