//! Database driver trait definition

use crate::{Connection, ExplainConfig, ProbeError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::str::FromStr;

/// The relational backends SQLProbe knows how to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    MySql,
    SqlServer,
}

impl BackendKind {
    /// Every known backend kind
    pub const ALL: [BackendKind; 2] = [BackendKind::MySql, BackendKind::SqlServer];

    /// Canonical identifier used in configuration (e.g., "mysql")
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::MySql => "mysql",
            BackendKind::SqlServer => "sqlserver",
        }
    }

    /// Human-readable name (e.g., "MySQL")
    pub fn display_name(&self) -> &'static str {
        match self {
            BackendKind::MySql => "MySQL",
            BackendKind::SqlServer => "SQL Server",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mysql" => Ok(BackendKind::MySql),
            "sqlserver" | "mssql" => Ok(BackendKind::SqlServer),
            _ => Err(ProbeError::UnsupportedBackend(s.to_string())),
        }
    }
}

/// Immutable backend selection plus connection string, owned by a service
/// for its whole lifetime.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    backend: BackendKind,
    connection_string: String,
}

impl ConnectionConfig {
    pub fn new(backend: BackendKind, connection_string: impl Into<String>) -> Self {
        Self {
            backend,
            connection_string: connection_string.into(),
        }
    }

    /// Build a configuration from an untrusted backend identifier.
    ///
    /// Fails with `UnsupportedBackend` for unknown identifiers.
    pub fn parse(backend: &str, connection_string: impl Into<String>) -> Result<Self> {
        let backend = backend
            .parse::<BackendKind>()
            .inspect_err(|e| tracing::warn!(error = %e, "rejected backend identifier"))?;
        Ok(Self::new(backend, connection_string))
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }
}

// Connection strings usually carry credentials.
impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("backend", &self.backend)
            .field("connection_string", &"<redacted>")
            .finish()
    }
}

/// Core driver trait that every backend implementation provides
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// The backend this driver serves
    fn kind(&self) -> BackendKind;

    /// Display name for logs and help output
    fn display_name(&self) -> &'static str {
        self.kind().display_name()
    }

    /// Connection string format help text
    fn connection_string_help(&self) -> &'static str {
        ""
    }

    /// How this backend exposes execution plans
    fn explain_config(&self) -> ExplainConfig {
        ExplainConfig::default()
    }

    /// Open a new connection. The caller owns it and must `close` it.
    async fn connect(&self, connection_string: &str) -> Result<Box<dyn Connection>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("mysql".parse::<BackendKind>().unwrap(), BackendKind::MySql);
        assert_eq!("MySQL".parse::<BackendKind>().unwrap(), BackendKind::MySql);
        assert_eq!(
            "SqlServer".parse::<BackendKind>().unwrap(),
            BackendKind::SqlServer
        );
        assert_eq!(
            " mssql ".parse::<BackendKind>().unwrap(),
            BackendKind::SqlServer
        );
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let err = "oracle".parse::<BackendKind>().unwrap_err();
        assert!(matches!(err, ProbeError::UnsupportedBackend(ref s) if s == "oracle"));

        let err = ConnectionConfig::parse("", "Server=x").unwrap_err();
        assert!(matches!(err, ProbeError::UnsupportedBackend(_)));
    }

    #[test]
    fn test_backend_kind_round_trips_through_display() {
        for kind in BackendKind::ALL {
            assert_eq!(kind.to_string().parse::<BackendKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_connection_config_debug_hides_connection_string() {
        let config = ConnectionConfig::new(BackendKind::MySql, "Server=db;Pwd=hunter2");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("MySql"));
        assert_eq!(config.connection_string(), "Server=db;Pwd=hunter2");
    }
}
