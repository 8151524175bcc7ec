//! Backend-specific EXPLAIN behavior

use std::borrow::Cow;

/// How a backend is asked for an execution plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplainStrategy {
    /// Prefix the statement with a keyword, e.g. `EXPLAIN SELECT ...`
    Prefix(Cow<'static, str>),
    /// Switch the session into plan mode, run the statement (which then
    /// returns its plan instead of its rows), and switch back.
    ///
    /// Each toggle must be sent as its own batch.
    SessionToggle {
        enable: Cow<'static, str>,
        disable: Cow<'static, str>,
    },
}

/// Configuration for EXPLAIN query generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainConfig {
    pub strategy: ExplainStrategy,
    /// Description of what the plan output contains
    pub description: Cow<'static, str>,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            strategy: ExplainStrategy::Prefix(Cow::Borrowed("EXPLAIN")),
            description: Cow::Borrowed("Shows query execution plan"),
        }
    }
}

impl ExplainConfig {
    /// Create MySQL-specific EXPLAIN configuration
    pub fn mysql() -> Self {
        Self {
            strategy: ExplainStrategy::Prefix(Cow::Borrowed("EXPLAIN")),
            description: Cow::Borrowed(
                "One row per table access with type, key, rows and Extra columns",
            ),
        }
    }

    /// Create SQL Server-specific configuration.
    ///
    /// T-SQL has no EXPLAIN keyword; SHOWPLAN_ALL returns the estimated plan
    /// as rows without executing the statement.
    pub fn sql_server() -> Self {
        Self {
            strategy: ExplainStrategy::SessionToggle {
                enable: Cow::Borrowed("SET SHOWPLAN_ALL ON"),
                disable: Cow::Borrowed("SET SHOWPLAN_ALL OFF"),
            },
            description: Cow::Borrowed(
                "One row per plan operator with PhysicalOp, LogicalOp, Argument and EstimateRows",
            ),
        }
    }

    /// The statement to send for the plan of `sql`.
    ///
    /// For prefix strategies this is `"<keyword> <sql>"`; for session toggles
    /// the statement itself is sent unchanged.
    pub fn format_explain(&self, sql: &str) -> String {
        match &self.strategy {
            ExplainStrategy::Prefix(keyword) => format!("{} {}", keyword, sql),
            ExplainStrategy::SessionToggle { .. } => sql.to_string(),
        }
    }

    /// Statements to run before and after the plan statement, if any
    pub fn session_toggles(&self) -> Option<(&str, &str)> {
        match &self.strategy {
            ExplainStrategy::Prefix(_) => None,
            ExplainStrategy::SessionToggle { enable, disable } => {
                Some((enable.as_ref(), disable.as_ref()))
            }
        }
    }
}
