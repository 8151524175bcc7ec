//! Pipeline response returned to callers

use serde::Serialize;
use sqlprobe_analyzer::Suggestion;
use sqlprobe_core::{QueryResult, Result};

/// What one pipeline run produces.
///
/// Serializes as `{results, executionTimeMillis, queryPlan, suggestions}` on
/// success and `{error}` when execution failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResponse {
    #[serde(rename_all = "camelCase")]
    Success {
        results: QueryResult,
        execution_time_millis: f64,
        query_plan: String,
        suggestions: Vec<Suggestion>,
    },
    Error {
        error: String,
    },
}

impl QueryResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error { error } => Some(error),
            Self::Success { .. } => None,
        }
    }

    pub fn results(&self) -> Option<&QueryResult> {
        match self {
            Self::Success { results, .. } => Some(results),
            Self::Error { .. } => None,
        }
    }

    pub fn query_plan(&self) -> Option<&str> {
        match self {
            Self::Success { query_plan, .. } => Some(query_plan),
            Self::Error { .. } => None,
        }
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        match self {
            Self::Success { suggestions, .. } => suggestions,
            Self::Error { .. } => &[],
        }
    }

    /// Serialize to a JSON string, pretty-printed if requested
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}
