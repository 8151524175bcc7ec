//! MS SQL Server driver for SQLProbe
//!
//! Connects through tiberius over a plain tokio `TcpStream`. SQL Server has
//! no `EXPLAIN` statement, so plans are read by switching the session into
//! `SHOWPLAN_ALL` mode around the statement.

mod connection;
mod driver;

#[cfg(test)]
mod connection_tests;
#[cfg(test)]
mod driver_tests;

pub use connection::{MssqlConnection, MssqlConnectionError};
pub use driver::MssqlDriver;
