//! Service settings loaded from TOML

use serde::{Deserialize, Serialize};
use sqlprobe_analyzer::AnalyzerConfig;
use sqlprobe_core::{ConnectionConfig, ProbeError, Result};
use std::path::Path;
use std::time::Duration;

/// Top-level settings file.
///
/// ```toml
/// [database]
/// type = "mysql"
/// connection_string = "Server=localhost;Database=shop;Uid=root;Pwd=secret"
///
/// [analyzer]
/// large_row_threshold = 100000
///
/// [execution]
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub database: DatabaseSettings,
    pub analyzer: AnalyzerConfig,
    pub execution: ExecutionSettings,
}

/// Backend selection
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    #[serde(rename = "type")]
    pub backend: Option<String>,
    pub connection_string: Option<String>,
}

impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("backend", &self.backend)
            .field(
                "connection_string",
                &self.connection_string.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    /// Per round-trip deadline in seconds; unset or zero means no deadline
    pub timeout_secs: Option<u64>,
}

impl ServiceSettings {
    /// Parse settings from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ProbeError::Configuration(e.to_string()))
    }

    /// Read and parse a settings file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&text).map_err(|e| match e {
            ProbeError::Configuration(msg) => {
                ProbeError::Configuration(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded settings file");
        Ok(settings)
    }

    /// Build the connection config, validating the backend name
    pub fn connection_config(&self) -> Result<ConnectionConfig> {
        let backend = self
            .database
            .backend
            .as_deref()
            .ok_or_else(|| ProbeError::Configuration("database type is not set".to_string()))?;
        let connection_string = self.database.connection_string.as_deref().ok_or_else(|| {
            ProbeError::Configuration("database connection string is not set".to_string())
        })?;
        ConnectionConfig::parse(backend, connection_string)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.execution
            .timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqlprobe_core::BackendKind;
    use std::io::Write;

    const FULL: &str = r#"
[database]
type = "SqlServer"
connection_string = "Server=tcp:localhost,1433;User Id=sa;Password=x"

[analyzer]
large_row_threshold = 5000

[execution]
timeout_secs = 30
"#;

    #[test]
    fn test_parse_full_settings() {
        let settings = ServiceSettings::from_toml_str(FULL).unwrap();
        let config = settings.connection_config().unwrap();
        assert_eq!(config.backend(), BackendKind::SqlServer);
        assert_eq!(
            config.connection_string(),
            "Server=tcp:localhost,1433;User Id=sa;Password=x"
        );
        assert_eq!(settings.analyzer.large_row_threshold, 5000);
        assert_eq!(settings.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_defaults() {
        let settings = ServiceSettings::from_toml_str("").unwrap();
        assert_eq!(settings, ServiceSettings::default());
        assert_eq!(settings.analyzer.large_row_threshold, 100_000);
        assert_eq!(settings.timeout(), None);
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let settings = ServiceSettings::from_toml_str("[execution]\ntimeout_secs = 0\n").unwrap();
        assert_eq!(settings.timeout(), None);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let settings = ServiceSettings::from_toml_str(
            "[database]\ntype = \"oracle\"\nconnection_string = \"x\"\n",
        )
        .unwrap();
        assert!(matches!(
            settings.connection_config(),
            Err(ProbeError::UnsupportedBackend(ref name)) if name == "oracle"
        ));
    }

    #[test]
    fn test_missing_values_are_configuration_errors() {
        let settings = ServiceSettings::default();
        assert!(matches!(
            settings.connection_config(),
            Err(ProbeError::Configuration(ref m)) if m.contains("type")
        ));

        let settings = ServiceSettings::from_toml_str("[database]\ntype = \"mysql\"\n").unwrap();
        assert!(matches!(
            settings.connection_config(),
            Err(ProbeError::Configuration(ref m)) if m.contains("connection string")
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            ServiceSettings::from_toml_str("[database\n"),
            Err(ProbeError::Configuration(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let settings = ServiceSettings::load(file.path()).unwrap();
        assert_eq!(settings.database.backend.as_deref(), Some("SqlServer"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = ServiceSettings::load(Path::new("/nonexistent/sqlprobe.toml")).unwrap_err();
        assert!(matches!(err, ProbeError::Io(_)));
    }

    #[test]
    fn test_debug_redacts_connection_string() {
        let settings = ServiceSettings::from_toml_str(FULL).unwrap();
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("Password=x"));
        assert!(debug.contains("<redacted>"));
    }
}
