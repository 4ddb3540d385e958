//! Deterministic JSON serialization for run reports.
//!
//! Reports are written with 2-space indentation and a trailing newline so
//! that repeated runs produce clean diffs.

mod json;

pub use json::*;
