//! SQLProbe Drivers - Database driver implementations
//!
//! This crate wires the concrete backend drivers to the traits defined in
//! `sqlprobe-core` and exposes them through a `DriverRegistry`.

#[cfg(feature = "sqlserver")]
pub use sqlprobe_driver_mssql as mssql;
#[cfg(feature = "mysql")]
pub use sqlprobe_driver_mysql as mysql;

mod registry;

pub use registry::DriverRegistry;

/// Re-export commonly used types from sqlprobe-core
pub use sqlprobe_core::{
    BackendKind, Command, Connection, ConnectionConfig, DatabaseDriver, ExplainConfig, ProbeError,
    Result, RowSet, Value,
};
