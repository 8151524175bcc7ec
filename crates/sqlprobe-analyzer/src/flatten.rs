//! Plan flattening
//!
//! Backends return plans as result sets. The analyzer works on a single
//! string, so every field of every row is written as `name: value; `.

use sqlprobe_core::{RowSet, Value};

/// Turns the rows of a plan-inspection statement into plan text
pub trait PlanFlattener: Send + Sync {
    fn flatten(&self, plan: &RowSet) -> String;
}

/// Writes `"<column>: <value>; "` for every field, row by row, in column
/// order. NULL fields are written as empty text. Output is not truncated.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldListFlattener;

impl FieldListFlattener {
    pub fn new() -> Self {
        Self
    }
}

impl PlanFlattener for FieldListFlattener {
    fn flatten(&self, plan: &RowSet) -> String {
        let mut text = String::new();
        for row in &plan.rows {
            for (column, value) in plan.columns.iter().zip(row) {
                text.push_str(&column.name);
                text.push_str(": ");
                if !matches!(value, Value::Null) {
                    text.push_str(&value.to_string());
                }
                text.push_str("; ");
            }
        }
        text
    }
}
