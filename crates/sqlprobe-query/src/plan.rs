//! Execution plan retrieval

use crate::deadline;
use crate::executor::preview;
use sqlprobe_analyzer::{FieldListFlattener, PlanFlattener};
use sqlprobe_core::{Connection, DatabaseDriver, ExplainConfig, ProbeError, Result, RowSet};
use std::sync::Arc;
use std::time::Duration;

/// Prefix of the plan text returned when the plan could not be read
pub const PLAN_ERROR_PREFIX: &str = "Error generating query plan: ";

/// Fetches a statement's execution plan and flattens it to text.
///
/// Uses its own connection, independent of any execution of the same
/// statement.
#[derive(Clone)]
pub struct PlanRetriever {
    driver: Arc<dyn DatabaseDriver>,
    connection_string: Arc<str>,
    flattener: Arc<dyn PlanFlattener>,
    timeout: Option<Duration>,
}

impl PlanRetriever {
    pub fn new(driver: Arc<dyn DatabaseDriver>, connection_string: impl Into<Arc<str>>) -> Self {
        Self {
            driver,
            connection_string: connection_string.into(),
            flattener: Arc::new(FieldListFlattener),
            timeout: None,
        }
    }

    /// Replace the default `name: value; ` flattener
    pub fn with_flattener(mut self, flattener: Arc<dyn PlanFlattener>) -> Self {
        self.flattener = flattener;
        self
    }

    /// Bound each backend round-trip by `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Plan text for `query`. Failures come back as text starting with
    /// `PLAN_ERROR_PREFIX` rather than as an error.
    #[tracing::instrument(skip(self, query), fields(backend = %self.driver.kind(), sql_preview = %preview(query)))]
    pub async fn get_plan(&self, query: &str) -> String {
        match self.try_get_plan(query).await {
            Ok(plan) => {
                tracing::debug!(plan_len = plan.len(), "query plan retrieved");
                plan
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to retrieve query plan");
                format!("{}{}", PLAN_ERROR_PREFIX, e)
            }
        }
    }

    /// Plan text for `query`, surfacing failures as errors
    pub async fn try_get_plan(&self, query: &str) -> Result<String> {
        if query.trim().is_empty() {
            return Err(ProbeError::EmptyQuery);
        }

        let explain = self.driver.explain_config();
        let mut conn = deadline::within(
            self.timeout,
            "connect",
            self.driver.connect(&self.connection_string),
        )
        .await?;

        let rows = deadline::within(
            self.timeout,
            "query plan",
            read_plan(conn.as_mut(), &explain, query),
        )
        .await;

        deadline::release(conn, self.timeout, deadline::timed_out(&rows)).await;
        Ok(self.flattener.flatten(&rows?))
    }
}

/// Run the plan-inspection statement for `query` on `conn`.
///
/// For session-toggle backends the toggle is switched off again even when
/// reading the plan fails.
async fn read_plan(
    conn: &mut dyn Connection,
    explain: &ExplainConfig,
    query: &str,
) -> Result<RowSet> {
    let Some((enable, disable)) = explain.session_toggles() else {
        let command = conn.prepare(&explain.format_explain(query))?;
        return conn.query(&command).await;
    };

    let enable_command = conn.prepare(enable)?;
    let disable_command = conn.prepare(disable)?;
    let command = conn.prepare(query)?;

    conn.execute(&enable_command)
        .await
        .map_err(|e| ProbeError::PlanRetrieval(format!("`{}` failed: {}", enable, e)))?;
    let plan = conn.query(&command).await;
    let reset = conn
        .execute(&disable_command)
        .await
        .map_err(|e| ProbeError::PlanRetrieval(format!("`{}` failed: {}", disable, e)));

    let plan = plan?;
    reset?;
    Ok(plan)
}

impl std::fmt::Debug for PlanRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanRetriever")
            .field("backend", &self.driver.kind())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
