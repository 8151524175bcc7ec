//! Driver registry for managing available database drivers

use sqlprobe_core::{BackendKind, DatabaseDriver, ProbeError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of available database drivers, keyed by backend
pub struct DriverRegistry {
    drivers: HashMap<BackendKind, Arc<dyn DatabaseDriver>>,
}

impl DriverRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            drivers: HashMap::new(),
        }
    }

    /// Create a registry with all built-in drivers registered
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();

        #[cfg(feature = "mysql")]
        registry.register(Arc::new(crate::mysql::MySqlDriver::new()));
        #[cfg(feature = "sqlserver")]
        registry.register(Arc::new(crate::mssql::MssqlDriver::new()));

        registry
    }

    /// Register a driver, replacing any previous driver for the same backend
    pub fn register(&mut self, driver: Arc<dyn DatabaseDriver>) {
        let kind = driver.kind();
        tracing::info!(driver = %kind, display_name = driver.display_name(), "registering database driver");
        self.drivers.insert(kind, driver);
    }

    /// Get the driver for a backend
    pub fn get(&self, kind: BackendKind) -> Result<Arc<dyn DatabaseDriver>> {
        match self.drivers.get(&kind) {
            Some(driver) => Ok(driver.clone()),
            None => {
                tracing::warn!(driver = %kind, "driver not found in registry");
                Err(ProbeError::UnsupportedBackend(kind.to_string()))
            }
        }
    }

    /// List all registered backends, in declaration order
    pub fn list(&self) -> Vec<BackendKind> {
        BackendKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.drivers.contains_key(kind))
            .collect()
    }

    /// Check if a backend has a registered driver
    pub fn has(&self, kind: BackendKind) -> bool {
        self.drivers.contains_key(&kind)
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
