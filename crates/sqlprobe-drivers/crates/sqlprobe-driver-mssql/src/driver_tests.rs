//! Unit tests for MS SQL Server driver

use super::*;
use sqlprobe_core::{BackendKind, DatabaseDriver, ExplainStrategy, ProbeError};

#[test]
fn test_mssql_driver_kind() {
    let driver = MssqlDriver::new();
    assert_eq!(driver.kind(), BackendKind::SqlServer);
    assert_eq!(driver.display_name(), "MS SQL Server");
}

#[test]
fn test_mssql_explain_uses_showplan_toggles() {
    let driver = MssqlDriver::new();
    let explain = driver.explain_config();
    assert!(matches!(explain.strategy, ExplainStrategy::SessionToggle { .. }));
    assert_eq!(
        explain.session_toggles(),
        Some(("SET SHOWPLAN_ALL ON", "SET SHOWPLAN_ALL OFF"))
    );
    assert_eq!(explain.format_explain("SELECT 1"), "SELECT 1");
}

#[test]
fn test_mssql_connection_string_help_mentions_server() {
    let driver = MssqlDriver::default();
    assert!(driver.connection_string_help().starts_with("Server="));
}

#[tokio::test]
async fn test_mssql_connect_rejects_empty_connection_string() {
    let driver = MssqlDriver::new();
    let err = driver.connect("").await.err().unwrap();
    assert!(matches!(err, ProbeError::Connection(ref m) if m.contains("empty")));
}
