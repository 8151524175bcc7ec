//! SQLProbe Query - Timed execution, plan retrieval, and the query pipeline
//!
//! This crate runs a statement against the configured backend, measures how
//! long it takes, fetches the backend's execution plan, and hands that plan to
//! the analyzer. `QueryService` ties the stages together and produces the
//! `QueryResponse` returned to callers.

mod deadline;
mod executor;
mod outcome;
mod plan;
mod response;
mod service;
mod settings;

pub use executor::QueryExecutor;
pub use outcome::{ExecutionOutcome, materialize};
pub use plan::{PLAN_ERROR_PREFIX, PlanRetriever};
pub use response::QueryResponse;
pub use service::{QueryService, ServiceOptions};
pub use settings::{DatabaseSettings, ExecutionSettings, ServiceSettings};
