//! MySQL connection implementation

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use mysql_async::{
    Conn, Opts, OptsBuilder, Row as MySqlRow, SslOpts, consts::ColumnType, prelude::*,
};
use sqlprobe_core::{
    ColumnMeta, Command, Connection, ConnectionStringParams, ProbeError, Result, RowSet, Value,
};

const DEFAULT_PORT: u16 = 3306;

const SERVER_KEYS: &[&str] = &["server", "host", "data source", "datasource"];
const PORT_KEYS: &[&str] = &["port"];
const DATABASE_KEYS: &[&str] = &["database", "initial catalog"];
const USER_KEYS: &[&str] = &["uid", "user id", "userid", "user", "username"];
const PASSWORD_KEYS: &[&str] = &["pwd", "password"];
const SSL_MODE_KEYS: &[&str] = &["sslmode", "ssl mode"];

/// MySQL connection errors
#[derive(Debug, thiserror::Error)]
pub enum MySqlConnectionError {
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

impl From<MySqlConnectionError> for ProbeError {
    fn from(err: MySqlConnectionError) -> Self {
        ProbeError::Connection(err.to_string())
    }
}

/// Parse a MySQL connection string.
///
/// Accepts `mysql://` URLs as well as ADO-style `Server=...;Uid=...` strings.
pub fn parse_connection_string(input: &str) -> std::result::Result<Opts, MySqlConnectionError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(MySqlConnectionError::InvalidConnectionString(
            "connection string is empty".to_string(),
        ));
    }

    if trimmed.starts_with("mysql://") {
        return Opts::from_url(trimmed)
            .map_err(|e| MySqlConnectionError::InvalidConnectionString(e.to_string()));
    }

    let params = ConnectionStringParams::parse(trimmed);
    for key in unsupported_keys(&params) {
        tracing::warn!(key, "ignoring unsupported MySQL connection string key");
    }

    let host = params
        .get(SERVER_KEYS)
        .ok_or_else(|| {
            MySqlConnectionError::InvalidConnectionString("missing Server".to_string())
        })?;
    let port = match params.get(PORT_KEYS) {
        Some(port) => port.parse::<u16>().map_err(|_| {
            MySqlConnectionError::InvalidConnectionString(format!("invalid Port `{}`", port))
        })?,
        None => DEFAULT_PORT,
    };

    let mut builder = OptsBuilder::default()
        .ip_or_hostname(host)
        .tcp_port(port);
    if let Some(db) = params.get(DATABASE_KEYS) {
        builder = builder.db_name(Some(db));
    }
    if let Some(user) = params.get(USER_KEYS) {
        builder = builder.user(Some(user));
    }
    if let Some(pass) = params.get(PASSWORD_KEYS) {
        builder = builder.pass(Some(pass));
    }
    if let Some(mode) = params.get(SSL_MODE_KEYS) {
        builder = builder.ssl_opts(ssl_opts_for_mode(mode)?);
    }

    Ok(builder.into())
}

/// Keys of an ADO-style string that the driver does not act on, sorted
pub(crate) fn unsupported_keys(params: &ConnectionStringParams) -> Vec<&str> {
    let known = [
        SERVER_KEYS,
        PORT_KEYS,
        DATABASE_KEYS,
        USER_KEYS,
        PASSWORD_KEYS,
        SSL_MODE_KEYS,
    ];
    let mut keys: Vec<&str> = params
        .keys()
        .filter(|key| !known.iter().any(|aliases| aliases.contains(key)))
        .collect();
    keys.sort_unstable();
    keys
}

/// Map an ADO `SslMode` value to TLS options.
///
/// `Required` encrypts without verifying the certificate, `VerifyCA` checks
/// the chain but not the host name, `VerifyFull` checks both. `Preferred`
/// has no opportunistic equivalent and connects without TLS.
pub(crate) fn ssl_opts_for_mode(
    mode: &str,
) -> std::result::Result<Option<SslOpts>, MySqlConnectionError> {
    match mode.to_lowercase().as_str() {
        "none" | "disabled" => Ok(None),
        "preferred" => {
            tracing::warn!("SslMode=Preferred connects without TLS");
            Ok(None)
        }
        "required" => Ok(Some(SslOpts::default().with_danger_accept_invalid_certs(true))),
        "verifyca" => Ok(Some(SslOpts::default().with_danger_skip_domain_validation(true))),
        "verifyfull" => Ok(Some(SslOpts::default())),
        _ => Err(MySqlConnectionError::InvalidConnectionString(format!(
            "invalid SslMode `{}`",
            mode
        ))),
    }
}

/// MySQL connection wrapper.
///
/// Holds one dedicated server connection; no pool is kept between calls.
pub struct MySqlConnection {
    conn: Conn,
}

impl MySqlConnection {
    /// Connect to a MySQL database
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let opts = parse_connection_string(connection_string)?;
        tracing::info!(
            host = %opts.ip_or_hostname(),
            port = opts.tcp_port(),
            database = ?opts.db_name(),
            "connecting to MySQL database"
        );

        let conn = Conn::new(opts)
            .await
            .map_err(|e| MySqlConnectionError::ConnectionFailed(e.to_string()))?;

        tracing::debug!("MySQL connection established");
        Ok(Self { conn })
    }
}

/// Convert mysql_async Value to our Value type, using column type metadata
/// to correctly interpret byte strings from the text protocol.
pub(crate) fn mysql_value_to_value(val: mysql_async::Value, col_type: ColumnType) -> Value {
    match val {
        mysql_async::Value::NULL => Value::Null,
        mysql_async::Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(s) => text_to_value(s, col_type),
            Err(e) => Value::Binary(e.into_bytes()),
        },
        mysql_async::Value::Int(i) => Value::Integer(i),
        mysql_async::Value::UInt(u) => {
            if u <= i64::MAX as u64 {
                Value::Integer(u as i64)
            } else {
                Value::Text(u.to_string())
            }
        }
        mysql_async::Value::Float(f) => Value::Float(f as f64),
        mysql_async::Value::Double(d) => Value::Float(d),
        mysql_async::Value::Date(year, month, day, hour, min, sec, micro) => {
            let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32);
            match date {
                Some(date) if hour == 0 && min == 0 && sec == 0 && micro == 0 => Value::Date(date),
                Some(date) => date
                    .and_hms_micro_opt(hour as u32, min as u32, sec as u32, micro)
                    .map(Value::DateTime)
                    .unwrap_or_else(|| {
                        Value::Text(format!(
                            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                            year, month, day, hour, min, sec
                        ))
                    }),
                // Zero dates (0000-00-00) have no chrono representation
                None => Value::Text(format!("{:04}-{:02}-{:02}", year, month, day)),
            }
        }
        mysql_async::Value::Time(negative, days, hours, mins, secs, micros) => {
            let total_hours = days * 24 + hours as u32;
            let sign = if negative { "-" } else { "" };
            Value::Text(format!(
                "{}{:02}:{:02}:{:02}.{:06}",
                sign, total_hours, mins, secs, micros
            ))
        }
    }
}

fn text_to_value(s: String, col_type: ColumnType) -> Value {
    match col_type {
        ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_LONGLONG
        | ColumnType::MYSQL_TYPE_INT24
        | ColumnType::MYSQL_TYPE_YEAR => s.parse::<i64>().map(Value::Integer).unwrap_or(Value::Text(s)),
        ColumnType::MYSQL_TYPE_FLOAT | ColumnType::MYSQL_TYPE_DOUBLE => {
            s.parse::<f64>().map(Value::Float).unwrap_or(Value::Text(s))
        }
        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map(Value::Date)
                .unwrap_or(Value::Text(s))
        }
        ColumnType::MYSQL_TYPE_DATETIME | ColumnType::MYSQL_TYPE_TIMESTAMP => {
            NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S%.f")
                .map(Value::DateTime)
                .unwrap_or(Value::Text(s))
        }
        // DECIMAL stays textual so no precision is lost
        _ => Value::Text(s),
    }
}

fn mysql_row_to_values(row: &MySqlRow, column_types: &[ColumnType]) -> Vec<Value> {
    column_types
        .iter()
        .enumerate()
        .map(|(idx, col_type)| {
            let raw: mysql_async::Value = row.get(idx).unwrap_or(mysql_async::Value::NULL);
            mysql_value_to_value(raw, *col_type)
        })
        .collect()
}

#[async_trait]
impl Connection for MySqlConnection {
    fn driver_name(&self) -> &str {
        "mysql"
    }

    #[tracing::instrument(skip(self, command), fields(sql_preview = %command.preview()))]
    async fn query(&mut self, command: &Command) -> Result<RowSet> {
        let sql = command.sql().to_string();
        let mysql_rows: Vec<MySqlRow> = self
            .conn
            .query(&sql)
            .await
            .map_err(|e| ProbeError::Execution(e.to_string()))?;

        let mut row_set = RowSet::default();
        let mut column_types = Vec::new();
        if let Some(first_row) = mysql_rows.first() {
            for (idx, col) in first_row.columns_ref().iter().enumerate() {
                column_types.push(col.column_type());
                row_set.columns.push(ColumnMeta::new(
                    col.name_str().to_string(),
                    format!("{:?}", col.column_type()),
                    idx,
                ));
            }
        }

        for mysql_row in &mysql_rows {
            row_set.push_row(mysql_row_to_values(mysql_row, &column_types));
        }

        tracing::debug!(row_count = row_set.row_count(), "query executed");
        Ok(row_set)
    }

    #[tracing::instrument(skip(self, command), fields(sql_preview = %command.preview()))]
    async fn execute(&mut self, command: &Command) -> Result<u64> {
        let sql = command.sql().to_string();
        self.conn
            .query_drop(&sql)
            .await
            .map_err(|e| ProbeError::Execution(e.to_string()))?;
        let affected_rows = self.conn.affected_rows();
        tracing::debug!(affected_rows, "statement executed");
        Ok(affected_rows)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        tracing::debug!("closing MySQL connection");
        self.conn
            .disconnect()
            .await
            .map_err(|e| ProbeError::Connection(format!("Failed to close MySQL connection: {}", e)))
    }
}
