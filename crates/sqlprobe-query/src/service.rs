//! Query pipeline service
//!
//! Runs a statement, fetches its plan when execution succeeded, and analyzes
//! the plan. Holds only immutable state, so one service can serve concurrent
//! callers; each call opens and closes its own connections.

use crate::executor::{QueryExecutor, preview};
use crate::outcome::ExecutionOutcome;
use crate::plan::PlanRetriever;
use crate::response::QueryResponse;
use crate::settings::ServiceSettings;
use sqlprobe_analyzer::{AnalyzerConfig, PlanAnalyzer, Suggestion};
use sqlprobe_core::{BackendKind, ConnectionConfig, DatabaseDriver, Result};
use sqlprobe_drivers::DriverRegistry;
use std::sync::Arc;
use std::time::Duration;

/// Tunables that are not part of the connection itself
#[derive(Debug, Clone, Default)]
pub struct ServiceOptions {
    pub analyzer: AnalyzerConfig,
    pub timeout: Option<Duration>,
}

impl ServiceOptions {
    pub fn with_analyzer(mut self, analyzer: AnalyzerConfig) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Service for executing queries and analyzing their plans
#[derive(Debug, Clone)]
pub struct QueryService {
    config: ConnectionConfig,
    executor: QueryExecutor,
    plans: PlanRetriever,
    analyzer: PlanAnalyzer,
}

impl QueryService {
    /// Create a service for `config` using the driver registered for its
    /// backend. Fails with `UnsupportedBackend` if none is registered.
    pub fn new(config: ConnectionConfig, registry: &DriverRegistry) -> Result<Self> {
        Self::with_options(config, registry, ServiceOptions::default())
    }

    pub fn with_options(
        config: ConnectionConfig,
        registry: &DriverRegistry,
        options: ServiceOptions,
    ) -> Result<Self> {
        let driver = registry.get(config.backend())?;
        Ok(Self::with_driver(config, driver, options))
    }

    /// Create a service from a settings file's contents
    pub fn from_settings(settings: &ServiceSettings, registry: &DriverRegistry) -> Result<Self> {
        let options = ServiceOptions::default()
            .with_analyzer(settings.analyzer.clone())
            .with_timeout(settings.timeout());
        Self::with_options(settings.connection_config()?, registry, options)
    }

    /// Create a service around an explicit driver
    pub fn with_driver(
        config: ConnectionConfig,
        driver: Arc<dyn DatabaseDriver>,
        options: ServiceOptions,
    ) -> Self {
        let connection_string: Arc<str> = Arc::from(config.connection_string());
        tracing::info!(
            backend = %config.backend(),
            driver = driver.display_name(),
            timeout = ?options.timeout,
            "query service created"
        );
        Self {
            executor: QueryExecutor::new(driver.clone(), connection_string.clone())
                .with_timeout(options.timeout),
            plans: PlanRetriever::new(driver, connection_string).with_timeout(options.timeout),
            analyzer: PlanAnalyzer::with_config(options.analyzer),
            config,
        }
    }

    pub fn backend(&self) -> BackendKind {
        self.config.backend()
    }

    /// Execute `query` and materialize its rows
    pub async fn execute(&self, query: &str) -> ExecutionOutcome {
        self.executor.execute(query).await
    }

    /// Fetch and flatten the plan for `query`
    pub async fn get_plan(&self, query: &str) -> String {
        self.plans.get_plan(query).await
    }

    /// Derive suggestions from plan text
    pub fn analyze(&self, plan: &str) -> Vec<Suggestion> {
        self.analyzer.analyze(plan)
    }

    /// Run the full pipeline for `query`.
    ///
    /// The plan is only requested when execution succeeded.
    #[tracing::instrument(skip(self, query), fields(backend = %self.backend(), sql_preview = %preview(query)))]
    pub async fn run(&self, query: &str) -> QueryResponse {
        let (results, elapsed) = match self.execute(query).await {
            ExecutionOutcome::Completed { results, elapsed } => (results, elapsed),
            ExecutionOutcome::Failed { error } => return QueryResponse::Error { error },
        };

        let query_plan = self.get_plan(query).await;
        let suggestions = self.analyze(&query_plan);

        tracing::info!(
            row_count = results.row_count(),
            duration_ms = elapsed.as_secs_f64() * 1000.0,
            suggestions = suggestions.len(),
            "query pipeline completed"
        );

        QueryResponse::Success {
            results,
            execution_time_millis: elapsed.as_secs_f64() * 1000.0,
            query_plan,
            suggestions,
        }
    }
}

#[cfg(test)]
mod tests;
