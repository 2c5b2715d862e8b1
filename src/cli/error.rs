//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(InfraError::Io { .. }) => exitcode::IOERR,
            CliError::Infra(InfraError::Application(e)) => match e {
                ApplicationError::Domain(_) => exitcode::DATAERR,
                ApplicationError::Config { .. }
                | ApplicationError::ConfigNotFound(_)
                | ApplicationError::BindingNotFound { .. }
                | ApplicationError::DatabaseNotConfigured { .. } => exitcode::CONFIG,
                ApplicationError::DatabaseNotFound(_) | ApplicationError::TableNotFound { .. } => {
                    exitcode::NOINPUT
                }
                ApplicationError::DatabaseExists(_) => exitcode::CANTCREAT,
                ApplicationError::ColumnExists(_) | ApplicationError::ColumnNotFound(_) => {
                    exitcode::DATAERR
                }
                ApplicationError::OperationFailed { .. } => exitcode::SOFTWARE,
            },
        }
    }
}
