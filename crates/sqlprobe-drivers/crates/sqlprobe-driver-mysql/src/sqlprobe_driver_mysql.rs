//! MySQL/MariaDB driver implementation

mod connection;
mod driver;

#[cfg(test)]
mod connection_tests;
#[cfg(test)]
mod driver_tests;

pub use connection::{MySqlConnection, MySqlConnectionError, parse_connection_string};
pub use driver::MySqlDriver;
