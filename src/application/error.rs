//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("unknown binding '{name}' (available: {available})")]
    BindingNotFound { name: String, available: String },

    #[error("binding '{binding}' refers to unknown database '{database}'")]
    DatabaseNotConfigured { binding: String, database: String },

    #[error("database does not exist: {0}")]
    DatabaseNotFound(PathBuf),

    #[error("database already exists: {0}")]
    DatabaseExists(PathBuf),

    #[error("table '{table}' not found in {}", .database.display())]
    TableNotFound { table: String, database: PathBuf },

    #[error("column '{0}' already exists")]
    ColumnExists(String),

    #[error("column '{0}' does not exist")]
    ColumnNotFound(String),

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
