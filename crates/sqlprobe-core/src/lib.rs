//! SQLProbe Core - Core abstractions shared by the execution and analysis crates
//!
//! This crate defines:
//!
//! - `DatabaseDriver` - Trait implemented once per supported backend
//! - `Connection` - Trait for a single, short-lived backend connection
//! - `Command` - A prepared-for-execution SQL statement
//! - `ExplainConfig` - How a backend exposes its execution plan
//! - Common types like `Value`, `RowSet`, `QueryResult`, `BackendKind`

mod connection;
mod connection_string;
mod dialect;
mod driver;
mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod fake;
mod types;

pub use connection::*;
pub use connection_string::*;
pub use dialect::*;
pub use driver::*;
pub use error::*;
pub use types::*;
