//! Query Analysis Suggestions Module
//!
//! This module turns a flattened execution plan into optimization suggestions.
//! Rules are plain substring and pattern checks over the plan text, evaluated
//! in a fixed order; each rule contributes at most one suggestion.

mod analyzer;

pub use analyzer::*;
