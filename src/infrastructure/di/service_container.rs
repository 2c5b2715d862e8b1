//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::services::DatabaseService;
use crate::application::DatabaseActions;
use crate::config::global_config_path;

/// Container holding all application services.
pub struct ServiceContainer {
    /// Provider for the `database` command group
    pub database: Arc<dyn DatabaseActions>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new() -> Self {
        Self::with_default_config(global_config_path())
    }

    /// Real implementations, with a specific fallback config file.
    pub fn with_default_config(default_config: Option<PathBuf>) -> Self {
        Self::with_deps(Arc::new(DatabaseService::new(default_config)))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(database: Arc<dyn DatabaseActions>) -> Self {
        Self { database }
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new()
    }
}
