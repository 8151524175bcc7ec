//! Plan Analyzer - Optimization Suggestions
//!
//! This module matches a flattened plan string against a fixed, ordered list of
//! rules. Matching is case-sensitive substring search, except for the large row
//! count rule which reads the first `rows=<n>` figure from the plan.

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::LazyLock;

static ROWS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"rows=(\d+)").expect("valid regex"));

/// Default row count above which the large row count rule fires
pub const DEFAULT_LARGE_ROW_THRESHOLD: u64 = 100_000;

/// Whether a suggestion reports a problem or confirms a good practice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    /// Something in the plan that is likely to hurt performance
    Problem,
    /// Something in the plan that is worth keeping
    GoodPractice,
}

impl SuggestionKind {
    /// Prefix every message of this kind starts with
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Problem => "Suggestion:",
            Self::GoodPractice => "Good practice:",
        }
    }
}

/// The analysis rules, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanRule {
    Filesort,
    TemporaryTable,
    FullTableScan,
    LargeRowCount,
    JoinBuffer,
    WhereFilter,
    IndexUsage,
}

impl PlanRule {
    /// Every rule in the order the analyzer evaluates them
    pub const ALL: [PlanRule; 7] = [
        PlanRule::Filesort,
        PlanRule::TemporaryTable,
        PlanRule::FullTableScan,
        PlanRule::LargeRowCount,
        PlanRule::JoinBuffer,
        PlanRule::WhereFilter,
        PlanRule::IndexUsage,
    ];

    /// Stable identifier for logs and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filesort => "filesort",
            Self::TemporaryTable => "temporary_table",
            Self::FullTableScan => "full_table_scan",
            Self::LargeRowCount => "large_row_count",
            Self::JoinBuffer => "join_buffer",
            Self::WhereFilter => "where_filter",
            Self::IndexUsage => "index_usage",
        }
    }

    pub fn kind(&self) -> SuggestionKind {
        match self {
            Self::WhereFilter | Self::IndexUsage => SuggestionKind::GoodPractice,
            _ => SuggestionKind::Problem,
        }
    }

    /// The suggestion text emitted when this rule matches
    pub fn message(&self) -> &'static str {
        match self {
            Self::Filesort => {
                "Suggestion: Avoid filesort by adding an appropriate index or optimizing the ORDER BY clause."
            }
            Self::TemporaryTable => {
                "Suggestion: Reduce temporary table usage by optimizing GROUP BY, ORDER BY, or using indexes."
            }
            Self::FullTableScan => {
                "Suggestion: A full table scan was detected. Consider adding indexes to improve performance."
            }
            Self::LargeRowCount => {
                "Suggestion: A large number of rows are being processed. Consider filtering data early in the query."
            }
            Self::JoinBuffer => {
                "Suggestion: Optimize JOIN conditions by ensuring indexes exist on the joined columns."
            }
            Self::WhereFilter => {
                "Good practice: The query is filtering data with WHERE conditions. Ensure proper indexing."
            }
            Self::IndexUsage => {
                "Good practice: The query is using an index. Verify that it's the most efficient one."
            }
        }
    }

    /// Check whether this rule fires for `plan`
    pub fn matches(&self, plan: &str, config: &AnalyzerConfig) -> bool {
        match self {
            Self::Filesort => plan.contains("Using filesort"),
            Self::TemporaryTable => plan.contains("Using temporary"),
            Self::FullTableScan => plan.contains("full table scan") || plan.contains("ALL"),
            Self::LargeRowCount => {
                has_row_count(plan)
                    && first_row_estimate(plan)
                        .is_some_and(|rows| rows > config.large_row_threshold)
            }
            Self::JoinBuffer => plan.contains("Using join buffer"),
            Self::WhereFilter => plan.contains("Using where"),
            Self::IndexUsage => plan.contains("index"),
        }
    }
}

impl std::fmt::Display for PlanRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the plan carries a row count at all, either as a flattened
/// `rows: ` field or an inline `rows=` figure
fn has_row_count(plan: &str) -> bool {
    plan.contains("rows:") || plan.contains("rows=")
}

/// The first `rows=<n>` figure in the plan. A figure too large for `u64`
/// saturates rather than being dropped.
pub(crate) fn first_row_estimate(plan: &str) -> Option<u64> {
    let digits = ROWS_REGEX.captures(plan)?.get(1)?.as_str();
    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
}

/// A single optimization suggestion.
///
/// Serializes as its message string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    rule: PlanRule,
}

impl Suggestion {
    pub fn new(rule: PlanRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> PlanRule {
        self.rule
    }

    pub fn kind(&self) -> SuggestionKind {
        self.rule.kind()
    }

    pub fn message(&self) -> &'static str {
        self.rule.message()
    }

    /// Returns true if this suggestion reports a problem
    pub fn is_problem(&self) -> bool {
        self.kind() == SuggestionKind::Problem
    }
}

impl std::fmt::Display for Suggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for Suggestion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// Configuration for the plan analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Row estimate above which the large row count rule fires
    pub large_row_threshold: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            large_row_threshold: DEFAULT_LARGE_ROW_THRESHOLD,
        }
    }
}

impl AnalyzerConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the large row threshold
    pub fn with_large_row_threshold(mut self, threshold: u64) -> Self {
        self.large_row_threshold = threshold;
        self
    }
}

/// Plan analyzer that provides optimization suggestions
#[derive(Debug, Clone, Default)]
pub struct PlanAnalyzer {
    config: AnalyzerConfig,
}

impl PlanAnalyzer {
    /// Creates a new analyzer with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new analyzer with custom config
    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Returns the analyzer config
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes plan text and returns suggestions in rule order.
    ///
    /// Pure: the same plan always yields the same suggestions, and each rule
    /// contributes at most once.
    pub fn analyze(&self, plan: &str) -> Vec<Suggestion> {
        PlanRule::ALL
            .iter()
            .filter(|rule| rule.matches(plan, &self.config))
            .map(|rule| Suggestion::new(*rule))
            .collect()
    }
}
