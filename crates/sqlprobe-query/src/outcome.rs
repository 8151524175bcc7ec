//! Execution outcomes and row materialization

use sqlprobe_core::{QueryResult, Record, RowSet};
use std::time::Duration;

/// Result of one execution attempt: either every row and the time it took,
/// or an error message. Never partial.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Completed {
        results: QueryResult,
        elapsed: Duration,
    },
    Failed {
        error: String,
    },
}

impl ExecutionOutcome {
    pub fn completed(results: QueryResult, elapsed: Duration) -> Self {
        Self::Completed { results, elapsed }
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self::Failed {
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn results(&self) -> Option<&QueryResult> {
        match self {
            Self::Completed { results, .. } => Some(results),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Completed { .. } => None,
            Self::Failed { error } => Some(error),
        }
    }

    /// Time spent running the statement and reading its rows; zero on failure
    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Completed { elapsed, .. } => *elapsed,
            Self::Failed { .. } => Duration::ZERO,
        }
    }
}

/// Convert positional rows into name-keyed records.
///
/// Column order is preserved. When two columns share a name the later value
/// wins and the column keeps its first position.
pub fn materialize(row_set: RowSet) -> QueryResult {
    let RowSet { columns, rows } = row_set;
    let records = rows
        .into_iter()
        .map(|values| {
            let mut record = Record::with_capacity(columns.len());
            for (column, value) in columns.iter().zip(values) {
                record.insert(column.name.clone(), value);
            }
            record
        })
        .collect();
    QueryResult::from_records(records)
}
