//! Tests for MS SQL Server connection module

use crate::connection::{MssqlConnectionError, column_data_to_value, parse_connection_string};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sqlprobe_core::{ProbeError, Value};
use std::borrow::Cow;
use tiberius::ColumnData;

// Connection string tests

#[test]
fn test_parse_ado_connection_string() {
    let config = parse_connection_string(
        "Server=tcp:db.internal,1444;Database=sales;User Id=sa;Password=Secret1!;TrustServerCertificate=true",
    )
    .unwrap();
    assert_eq!(config.get_addr(), "db.internal:1444");
}

#[test]
fn test_parse_empty_connection_string() {
    let err = parse_connection_string("  ").unwrap_err();
    assert!(matches!(err, MssqlConnectionError::InvalidConnectionString(_)));
}

#[test]
fn test_error_mapping() {
    let conn: ProbeError = MssqlConnectionError::ConnectionFailed("timeout".into()).into();
    assert!(matches!(conn, ProbeError::Connection(_)));

    let exec: ProbeError = MssqlConnectionError::QueryFailed("Invalid object name 'x'".into()).into();
    assert!(matches!(exec, ProbeError::Execution(ref m) if m == "Invalid object name 'x'"));
}

// Value conversion tests

#[test]
fn test_null_columns() {
    for data in [
        ColumnData::I32(None),
        ColumnData::String(None),
        ColumnData::Bit(None),
        ColumnData::F64(None),
        ColumnData::Binary(None),
    ] {
        assert_eq!(column_data_to_value(data).unwrap(), Value::Null);
    }
}

#[test]
fn test_integer_widths_collapse_to_integer() {
    assert_eq!(column_data_to_value(ColumnData::U8(Some(7))).unwrap(), Value::Integer(7));
    assert_eq!(column_data_to_value(ColumnData::I16(Some(-3))).unwrap(), Value::Integer(-3));
    assert_eq!(
        column_data_to_value(ColumnData::I32(Some(100_000))).unwrap(),
        Value::Integer(100_000)
    );
    assert_eq!(
        column_data_to_value(ColumnData::I64(Some(9_999_999_999))).unwrap(),
        Value::Integer(9_999_999_999)
    );
}

#[test]
fn test_float_bool_text_binary() {
    assert_eq!(column_data_to_value(ColumnData::F32(Some(1.5))).unwrap(), Value::Float(1.5));
    assert_eq!(column_data_to_value(ColumnData::F64(Some(2.25))).unwrap(), Value::Float(2.25));
    assert_eq!(column_data_to_value(ColumnData::Bit(Some(true))).unwrap(), Value::Bool(true));
    assert_eq!(
        column_data_to_value(ColumnData::String(Some(Cow::Owned("Clustered Index Scan".into()))))
            .unwrap(),
        Value::Text("Clustered Index Scan".to_string())
    );
    assert_eq!(
        column_data_to_value(ColumnData::Binary(Some(Cow::Owned(vec![1, 2, 3])))).unwrap(),
        Value::Binary(vec![1, 2, 3])
    );
}

#[test]
fn test_date_conversion() {
    let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let days = expected
        .signed_duration_since(NaiveDate::from_ymd_opt(1, 1, 1).unwrap())
        .num_days() as u32;
    let value = column_data_to_value(ColumnData::Date(Some(tiberius::time::Date::new(days)))).unwrap();
    assert_eq!(value, Value::Date(expected));
}

// Live database tests

fn live_url() -> Option<String> {
    std::env::var("SQLPROBE_TEST_MSSQL_URL").ok()
}

#[tokio::test]
#[ignore = "requires a SQL Server instance; set SQLPROBE_TEST_MSSQL_URL"]
async fn test_live_select_one() {
    use sqlprobe_core::{Connection, DatabaseDriver};

    let Some(url) = live_url() else { return };
    let driver = crate::MssqlDriver::new();
    let mut conn = driver.connect(&url).await.unwrap();
    let command = conn.prepare("SELECT 1 AS one").unwrap();
    let rows = conn.query(&command).await.unwrap();
    assert_eq!(rows.row_count(), 1);
    assert_eq!(rows.rows[0][0], Value::Integer(1));
    conn.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a SQL Server instance; set SQLPROBE_TEST_MSSQL_URL"]
async fn test_live_showplan_returns_operators() {
    use sqlprobe_core::{Connection, DatabaseDriver};

    let Some(url) = live_url() else { return };
    let driver = crate::MssqlDriver::new();
    let mut conn = driver.connect(&url).await.unwrap();
    let explain = driver.explain_config();
    let (enable, disable) = explain.session_toggles().unwrap();
    let enable = conn.prepare(enable).unwrap();
    let statement = conn.prepare("SELECT 1 AS one").unwrap();
    let disable = conn.prepare(disable).unwrap();

    conn.execute(&enable).await.unwrap();
    let plan = conn.query(&statement).await.unwrap();
    conn.execute(&disable).await.unwrap();

    assert!(plan.column_names().any(|name| name == "PhysicalOp"));
    conn.close().await.unwrap();
}
