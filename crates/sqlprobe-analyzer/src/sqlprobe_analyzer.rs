//! SQLProbe Analyzer - Plan flattening and optimization suggestions
//!
//! This crate provides functionality for:
//! - Flattening the rows of a plan-inspection statement into one plan string
//! - Matching that string against an ordered set of heuristic rules
//! - Reporting problems and good practices as human-readable suggestions

pub mod flatten;
pub mod suggestions;

pub use flatten::*;
pub use suggestions::*;
