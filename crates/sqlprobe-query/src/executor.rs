//! Timed statement execution

use crate::deadline;
use crate::outcome::{ExecutionOutcome, materialize};
use sqlprobe_core::{Connection, DatabaseDriver, ProbeError, QueryResult, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runs statements through one driver, timing each run.
///
/// Every call opens its own connection and closes it before returning, on
/// success and on failure alike.
#[derive(Clone)]
pub struct QueryExecutor {
    driver: Arc<dyn DatabaseDriver>,
    connection_string: Arc<str>,
    timeout: Option<Duration>,
}

impl QueryExecutor {
    pub fn new(driver: Arc<dyn DatabaseDriver>, connection_string: impl Into<Arc<str>>) -> Self {
        Self {
            driver,
            connection_string: connection_string.into(),
            timeout: None,
        }
    }

    /// Bound each backend round-trip by `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Execute `query` and materialize every row.
    ///
    /// Connecting is not timed; the clock covers preparing, running and
    /// reading the result. Any failure is reported in the outcome.
    #[tracing::instrument(skip(self, query), fields(backend = %self.driver.kind(), sql_preview = %preview(query)))]
    pub async fn execute(&self, query: &str) -> ExecutionOutcome {
        if query.trim().is_empty() {
            return ExecutionOutcome::failed(ProbeError::EmptyQuery);
        }

        match self.run(query).await {
            Ok((results, elapsed)) => {
                tracing::debug!(
                    row_count = results.row_count(),
                    duration_ms = elapsed.as_secs_f64() * 1000.0,
                    "query executed"
                );
                ExecutionOutcome::completed(results, elapsed)
            }
            Err(e) => {
                tracing::error!(error = %e, "query execution failed");
                ExecutionOutcome::failed(e)
            }
        }
    }

    async fn run(&self, query: &str) -> Result<(QueryResult, Duration)> {
        let mut conn = deadline::within(
            self.timeout,
            "connect",
            self.driver.connect(&self.connection_string),
        )
        .await?;

        let result = deadline::within(self.timeout, "query", timed_query(conn.as_mut(), query)).await;

        deadline::release(conn, self.timeout, deadline::timed_out(&result)).await;
        result
    }
}

async fn timed_query(conn: &mut dyn Connection, query: &str) -> Result<(QueryResult, Duration)> {
    let command = conn.prepare(query)?;
    let start = Instant::now();
    let rows = conn.query(&command).await?;
    let results = materialize(rows);
    Ok((results, start.elapsed()))
}

pub(crate) fn preview(sql: &str) -> String {
    sql.chars().take(100).collect()
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("backend", &self.driver.kind())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
