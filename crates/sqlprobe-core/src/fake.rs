//! In-memory driver for tests.
//!
//! `FakeDriver` answers commands from a script keyed by exact SQL text and
//! records every connection it opens, every statement it sees, and every
//! close, so callers can assert on resource handling without a database.

use crate::{
    BackendKind, Command, Connection, DatabaseDriver, ExplainConfig, ProbeError, Result, RowSet,
    Value,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Scripted reply for one SQL text
#[derive(Debug, Clone)]
pub enum FakeResponse {
    Rows(RowSet),
    Affected(u64),
    Error(String),
}

#[derive(Default)]
struct FakeState {
    script: Mutex<HashMap<String, FakeResponse>>,
    statements: Mutex<Vec<String>>,
    connect_error: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
    close_delay: Mutex<Option<Duration>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
    abandoned: AtomicUsize,
}

/// Scriptable driver standing in for a real backend
pub struct FakeDriver {
    kind: BackendKind,
    explain: ExplainConfig,
    state: Arc<FakeState>,
}

impl FakeDriver {
    /// Create a fake for `kind` that already answers `SELECT 1` with a
    /// single row.
    pub fn new(kind: BackendKind) -> Self {
        let driver = Self {
            kind,
            explain: ExplainConfig::default(),
            state: Arc::new(FakeState::default()),
        };
        driver.script(
            "SELECT 1",
            FakeResponse::Rows(RowSet::from_values(&["1"], vec![vec![Value::Integer(1)]])),
        );
        driver
    }

    /// Use a specific EXPLAIN configuration
    pub fn with_explain_config(mut self, explain: ExplainConfig) -> Self {
        self.explain = explain;
        self
    }

    /// Answer `sql` with `response`
    pub fn script(&self, sql: &str, response: FakeResponse) {
        self.state.script.lock().insert(sql.to_string(), response);
    }

    /// Answer `sql` with rows
    pub fn script_rows(&self, sql: &str, rows: RowSet) {
        self.script(sql, FakeResponse::Rows(rows));
    }

    /// Answer `sql` with an execution error
    pub fn script_error(&self, sql: &str, message: &str) {
        self.script(sql, FakeResponse::Error(message.to_string()));
    }

    /// Make every subsequent `connect` fail
    pub fn fail_connections(&self, message: &str) {
        *self.state.connect_error.lock() = Some(message.to_string());
    }

    /// Sleep this long before answering each command
    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock() = Some(delay);
    }

    /// Sleep this long inside each `close`
    pub fn set_close_delay(&self, delay: Duration) {
        *self.state.close_delay.lock() = Some(delay);
    }

    /// Number of successful `connect` calls
    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    /// Number of `close` calls
    pub fn closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    /// Number of connections dropped without a completed `close`
    pub fn abandoned(&self) -> usize {
        self.state.abandoned.load(Ordering::SeqCst)
    }

    /// Every statement received so far, in order
    pub fn statements(&self) -> Vec<String> {
        self.state.statements.lock().clone()
    }
}

#[async_trait]
impl DatabaseDriver for FakeDriver {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn display_name(&self) -> &'static str {
        "Fake"
    }

    fn explain_config(&self) -> ExplainConfig {
        self.explain.clone()
    }

    async fn connect(&self, _connection_string: &str) -> Result<Box<dyn Connection>> {
        if let Some(message) = self.state.connect_error.lock().clone() {
            return Err(ProbeError::Connection(message));
        }
        let opened = self.state.opened.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(backend = %self.kind, opened, "fake connection opened");
        Ok(Box::new(FakeConnection {
            name: self.kind.as_str(),
            closed: false,
            state: self.state.clone(),
        }))
    }
}

/// Connection handed out by `FakeDriver`
pub struct FakeConnection {
    name: &'static str,
    closed: bool,
    state: Arc<FakeState>,
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        if !self.closed {
            self.state.abandoned.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl FakeConnection {
    async fn respond(&self, command: &Command) -> Result<FakeResponse> {
        self.state.statements.lock().push(command.sql().to_string());
        let delay = *self.state.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.state
            .script
            .lock()
            .get(command.sql())
            .cloned()
            .ok_or_else(|| {
                ProbeError::Execution(format!("no scripted response for `{}`", command.sql()))
            })
    }
}

#[async_trait]
impl Connection for FakeConnection {
    fn driver_name(&self) -> &str {
        self.name
    }

    async fn query(&mut self, command: &Command) -> Result<RowSet> {
        match self.respond(command).await? {
            FakeResponse::Rows(rows) => Ok(rows),
            FakeResponse::Affected(_) => Ok(RowSet::default()),
            FakeResponse::Error(message) => Err(ProbeError::Execution(message)),
        }
    }

    async fn execute(&mut self, command: &Command) -> Result<u64> {
        match self.respond(command).await? {
            FakeResponse::Rows(rows) => Ok(rows.row_count() as u64),
            FakeResponse::Affected(n) => Ok(n),
            FakeResponse::Error(message) => Err(ProbeError::Execution(message)),
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut conn = self;
        let delay = *conn.state.close_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        conn.closed = true;
        conn.state.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
