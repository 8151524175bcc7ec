//! MySQL driver implementation

use async_trait::async_trait;
use sqlprobe_core::{BackendKind, Connection, DatabaseDriver, ExplainConfig, Result};

use crate::MySqlConnection;

/// MySQL database driver
pub struct MySqlDriver;

impl MySqlDriver {
    /// Create a new MySQL driver instance
    pub fn new() -> Self {
        tracing::debug!("MySQL driver initialized");
        Self
    }
}

impl Default for MySqlDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for MySqlDriver {
    fn kind(&self) -> BackendKind {
        BackendKind::MySql
    }

    fn display_name(&self) -> &'static str {
        "MySQL"
    }

    fn connection_string_help(&self) -> &'static str {
        "mysql://[user[:password]@]host[:port][/database] or Server=host;Port=3306;Database=db;Uid=user;Pwd=pass"
    }

    fn explain_config(&self) -> ExplainConfig {
        ExplainConfig::mysql()
    }

    #[tracing::instrument(skip(self, connection_string))]
    async fn connect(&self, connection_string: &str) -> Result<Box<dyn Connection>> {
        let conn = MySqlConnection::connect(connection_string)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to connect to MySQL database"))?;
        Ok(Box::new(conn))
    }
}
