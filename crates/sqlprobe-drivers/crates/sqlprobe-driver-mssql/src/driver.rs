//! MS SQL Server driver implementation

use crate::connection::MssqlConnection;
use async_trait::async_trait;
use sqlprobe_core::{BackendKind, Connection, DatabaseDriver, ExplainConfig, Result};

/// MS SQL Server database driver
pub struct MssqlDriver;

impl MssqlDriver {
    /// Create a new MS SQL Server driver instance
    pub fn new() -> Self {
        tracing::debug!("MS SQL Server driver initialized");
        Self
    }
}

impl Default for MssqlDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for MssqlDriver {
    fn kind(&self) -> BackendKind {
        BackendKind::SqlServer
    }

    fn display_name(&self) -> &'static str {
        "MS SQL Server"
    }

    fn connection_string_help(&self) -> &'static str {
        "Server=tcp:host,1433;Database=db;User Id=user;Password=pass;TrustServerCertificate=true"
    }

    fn explain_config(&self) -> ExplainConfig {
        ExplainConfig::sql_server()
    }

    #[tracing::instrument(skip(self, connection_string))]
    async fn connect(&self, connection_string: &str) -> Result<Box<dyn Connection>> {
        tracing::debug!("connecting to MS SQL Server");
        let connection = MssqlConnection::connect(connection_string)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to connect to MS SQL Server"))?;
        Ok(Box::new(connection))
    }
}
