//! MS SQL Server connection implementation using tiberius

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use sqlprobe_core::{ColumnMeta, Command, Connection, ProbeError, Result, RowSet, Value};
use tiberius::{Client, ColumnData, Config, Row as TiberiusRow};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

/// MS SQL Server connection errors
#[derive(Debug, thiserror::Error)]
pub enum MssqlConnectionError {
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Type conversion error: {0}")]
    TypeConversion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MssqlConnectionError> for ProbeError {
    fn from(err: MssqlConnectionError) -> Self {
        match err {
            MssqlConnectionError::QueryFailed(msg) | MssqlConnectionError::TypeConversion(msg) => {
                ProbeError::Execution(msg)
            }
            other => ProbeError::Connection(other.to_string()),
        }
    }
}

/// Parse an ADO.NET style connection string into a tiberius config
pub(crate) fn parse_connection_string(
    connection_string: &str,
) -> std::result::Result<Config, MssqlConnectionError> {
    if connection_string.trim().is_empty() {
        return Err(MssqlConnectionError::InvalidConnectionString(
            "connection string is empty".to_string(),
        ));
    }
    Config::from_ado_string(connection_string)
        .map_err(|e| MssqlConnectionError::InvalidConnectionString(e.to_string()))
}

type TdsClient = Client<Compat<TcpStream>>;

async fn open_client(config: Config) -> std::result::Result<TdsClient, MssqlConnectionError> {
    let tcp = TcpStream::connect(config.get_addr())
        .await
        .map_err(|e| MssqlConnectionError::ConnectionFailed(e.to_string()))?;
    tcp.set_nodelay(true)?;

    match Client::connect(config.clone(), tcp.compat_write()).await {
        Ok(client) => Ok(client),
        // Azure SQL gateways redirect the login to the actual node
        Err(tiberius::error::Error::Routing { host, port }) => {
            tracing::debug!(%host, port, "following SQL Server routing redirect");
            let mut config = config;
            config.host(&host);
            config.port(port);
            let tcp = TcpStream::connect(config.get_addr())
                .await
                .map_err(|e| MssqlConnectionError::ConnectionFailed(e.to_string()))?;
            tcp.set_nodelay(true)?;
            Client::connect(config, tcp.compat_write())
                .await
                .map_err(|e| MssqlConnectionError::ConnectionFailed(e.to_string()))
        }
        Err(e) => Err(MssqlConnectionError::ConnectionFailed(e.to_string())),
    }
}

/// MS SQL Server connection using tiberius
pub struct MssqlConnection {
    client: TdsClient,
}

impl MssqlConnection {
    /// Connect using an ADO.NET style connection string, e.g.
    /// `Server=tcp:localhost,1433;Database=app;User Id=sa;Password=...;TrustServerCertificate=true`
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let config = parse_connection_string(connection_string)?;
        tracing::info!(addr = %config.get_addr(), "connecting to MS SQL Server");

        let client = open_client(config).await?;

        tracing::debug!("successfully connected to MS SQL Server");
        Ok(Self { client })
    }

    async fn run_batch(&mut self, sql: &str) -> std::result::Result<RowSet, MssqlConnectionError> {
        let mut stream = self
            .client
            .simple_query(sql)
            .await
            .map_err(|e| MssqlConnectionError::QueryFailed(e.to_string()))?;

        // Read column metadata up front so empty results still carry it
        let columns: Vec<ColumnMeta> = stream
            .columns()
            .await
            .map_err(|e| MssqlConnectionError::QueryFailed(e.to_string()))?
            .map(|cols| {
                cols.iter()
                    .enumerate()
                    .map(|(idx, col)| tiberius_column_to_meta(col, idx))
                    .collect()
            })
            .unwrap_or_default();

        let tib_rows = stream
            .into_first_result()
            .await
            .map_err(|e| MssqlConnectionError::QueryFailed(e.to_string()))?;

        let mut row_set = RowSet::new(columns);
        for tib_row in tib_rows {
            row_set.push_row(tiberius_row_to_values(tib_row)?);
        }
        Ok(row_set)
    }
}

#[async_trait]
impl Connection for MssqlConnection {
    fn driver_name(&self) -> &str {
        "mssql"
    }

    #[tracing::instrument(skip(self, command), fields(sql_preview = %command.preview()))]
    async fn query(&mut self, command: &Command) -> Result<RowSet> {
        let row_set = self
            .run_batch(command.sql())
            .await
            .inspect_err(|e| tracing::error!(error = %e, "query failed"))?;
        tracing::debug!(row_count = row_set.row_count(), "query completed");
        Ok(row_set)
    }

    /// Runs `sql` as a plain batch so session `SET` options persist for
    /// later commands. The batch path reports no affected-row count, so the
    /// returned number is the count of rows the batch produced.
    #[tracing::instrument(skip(self, command), fields(sql_preview = %command.preview()))]
    async fn execute(&mut self, command: &Command) -> Result<u64> {
        let results = self
            .client
            .simple_query(command.sql())
            .await
            .map_err(|e| MssqlConnectionError::QueryFailed(e.to_string()))?
            .into_results()
            .await
            .map_err(|e| MssqlConnectionError::QueryFailed(e.to_string()))?;
        let produced: usize = results.iter().map(Vec::len).sum();
        Ok(produced as u64)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.client
            .close()
            .await
            .map_err(|e| ProbeError::Connection(format!("Failed to close SQL Server connection: {}", e)))?;
        tracing::debug!("MS SQL Server connection closed");
        Ok(())
    }
}

impl std::fmt::Debug for MssqlConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MssqlConnection").finish_non_exhaustive()
    }
}

/// Convert a tiberius column to ColumnMeta
fn tiberius_column_to_meta(col: &tiberius::Column, ordinal: usize) -> ColumnMeta {
    ColumnMeta::new(col.name(), format!("{:?}", col.column_type()), ordinal)
}

/// Convert a tiberius row to a vector of Values by consuming the row
fn tiberius_row_to_values(
    row: TiberiusRow,
) -> std::result::Result<Vec<Value>, MssqlConnectionError> {
    row.into_iter().map(column_data_to_value).collect()
}

fn date_from_days(
    year: i32,
    days: i64,
) -> std::result::Result<NaiveDate, MssqlConnectionError> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|base| base.checked_add_signed(Duration::days(days)))
        .ok_or_else(|| {
            MssqlConnectionError::TypeConversion(format!("date out of range: {} days", days))
        })
}

/// TIME/DATETIME2 count `10^-scale` second increments since midnight
fn time_from_increments(time: &tiberius::time::Time) -> NaiveTime {
    let scale = u32::from(time.scale().min(7));
    let per_second = 10u64.pow(scale);
    let increments = time.increments();
    NaiveTime::from_num_seconds_from_midnight_opt(
        (increments / per_second) as u32,
        ((increments % per_second) * 10u64.pow(9 - scale)) as u32,
    )
    .unwrap_or_default()
}

/// Convert tiberius ColumnData to a probe Value
pub(crate) fn column_data_to_value(
    col_data: ColumnData<'static>,
) -> std::result::Result<Value, MssqlConnectionError> {
    let value = match col_data {
        ColumnData::Bit(v) => v.map(Value::Bool).unwrap_or(Value::Null),
        ColumnData::U8(v) => v.map(|v| Value::Integer(v as i64)).unwrap_or(Value::Null),
        ColumnData::I16(v) => v.map(|v| Value::Integer(v as i64)).unwrap_or(Value::Null),
        ColumnData::I32(v) => v.map(|v| Value::Integer(v as i64)).unwrap_or(Value::Null),
        ColumnData::I64(v) => v.map(Value::Integer).unwrap_or(Value::Null),
        ColumnData::F32(v) => v.map(|v| Value::Float(v as f64)).unwrap_or(Value::Null),
        ColumnData::F64(v) => v.map(Value::Float).unwrap_or(Value::Null),
        ColumnData::String(v) => v
            .map(|s| Value::Text(s.into_owned()))
            .unwrap_or(Value::Null),
        ColumnData::Guid(v) => v.map(|g| Value::Text(g.to_string())).unwrap_or(Value::Null),
        ColumnData::Binary(v) => v
            .map(|b| Value::Binary(b.into_owned()))
            .unwrap_or(Value::Null),
        ColumnData::Numeric(v) => v.map(|n| Value::Text(n.to_string())).unwrap_or(Value::Null),
        ColumnData::Xml(v) => v
            .map(|x| Value::Text(x.into_owned().into_string()))
            .unwrap_or(Value::Null),
        ColumnData::DateTime(None)
        | ColumnData::SmallDateTime(None)
        | ColumnData::DateTime2(None)
        | ColumnData::DateTimeOffset(None)
        | ColumnData::Date(None)
        | ColumnData::Time(None) => Value::Null,
        ColumnData::DateTime(Some(v)) => {
            // 1/300 second ticks since 1900-01-01
            let date = date_from_days(1900, v.days() as i64)?;
            let nanos = (v.seconds_fragments() as u64) * 1_000_000_000 / 300;
            let time = NaiveTime::from_num_seconds_from_midnight_opt(
                (nanos / 1_000_000_000) as u32,
                (nanos % 1_000_000_000) as u32,
            )
            .unwrap_or_default();
            Value::DateTime(NaiveDateTime::new(date, time))
        }
        ColumnData::SmallDateTime(Some(v)) => {
            let date = date_from_days(1900, v.days() as i64)?;
            let time =
                NaiveTime::from_num_seconds_from_midnight_opt((v.seconds_fragments() as u32) * 60, 0)
                    .unwrap_or_default();
            Value::DateTime(NaiveDateTime::new(date, time))
        }
        ColumnData::DateTime2(Some(v)) => {
            let date = date_from_days(1, v.date().days() as i64)?;
            Value::DateTime(NaiveDateTime::new(date, time_from_increments(&v.time())))
        }
        ColumnData::DateTimeOffset(Some(v)) => {
            let dt2 = v.datetime2();
            let date = date_from_days(1, dt2.date().days() as i64)?;
            Value::DateTime(NaiveDateTime::new(date, time_from_increments(&dt2.time())))
        }
        ColumnData::Date(Some(v)) => Value::Date(date_from_days(1, v.days() as i64)?),
        ColumnData::Time(Some(v)) => {
            Value::Text(time_from_increments(&v).format("%H:%M:%S%.f").to_string())
        }
    };
    Ok(value)
}
