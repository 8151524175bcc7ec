//! Connection trait and commands

use crate::{ProbeError, Result, RowSet};
use async_trait::async_trait;

/// A SQL statement ready to run against one connection.
///
/// The text is passed to the backend verbatim; the only check is that it is
/// not blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    sql: String,
}

impl Command {
    pub fn new(sql: impl Into<String>) -> Result<Self> {
        let sql = sql.into();
        if sql.trim().is_empty() {
            return Err(ProbeError::EmptyQuery);
        }
        Ok(Self { sql })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// First 100 characters, for log fields
    pub fn preview(&self) -> String {
        self.sql.chars().take(100).collect()
    }
}

/// A live connection to one backend.
///
/// Connections are opened per call and never shared between callers, so
/// methods take `&mut self`.
#[async_trait]
pub trait Connection: Send {
    /// Get the driver name (e.g., "mysql", "sqlserver")
    fn driver_name(&self) -> &str;

    /// Build a command for `sql` on this connection
    fn prepare(&self, sql: &str) -> Result<Command> {
        Command::new(sql)
    }

    /// Run a command that returns rows and read every row
    async fn query(&mut self, command: &Command) -> Result<RowSet>;

    /// Run a command for its side effects, returning affected rows
    async fn execute(&mut self, command: &Command) -> Result<u64>;

    /// Release the connection
    async fn close(self: Box<Self>) -> Result<()>;
}
