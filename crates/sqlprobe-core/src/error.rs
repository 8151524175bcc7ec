//! Error types for SQLProbe

use thiserror::Error;

/// Core error type for SQLProbe operations
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The configured backend kind is not known or has no registered driver.
    #[error("Unsupported database type: {0}")]
    UnsupportedBackend(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Query plan error: {0}")]
    PlanRetrieval(String),

    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProbeError {
    /// Returns true for errors that indicate a configuration defect rather
    /// than a runtime or query condition.
    pub fn is_configuration_defect(&self) -> bool {
        matches!(
            self,
            ProbeError::UnsupportedBackend(_) | ProbeError::Configuration(_)
        )
    }
}

/// Result type alias for SQLProbe operations
pub type Result<T> = std::result::Result<T, ProbeError>;
