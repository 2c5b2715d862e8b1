//! Domain-level errors (no external dependencies)

use chrono::NaiveDate;
use thiserror::Error;

/// Domain errors represent invalid values for archive operations.
/// These are independent of storage concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid column name: '{0}'")]
    InvalidColumnName(String),

    #[error("invalid column type: '{0}' (expected REAL or INTEGER)")]
    InvalidColumnType(String),

    #[error("invalid date '{0}': expected YYYY-mm-dd")]
    InvalidDate(String),

    #[error("--date cannot be combined with --from or --to")]
    ConflictingDates,

    #[error("invalid date range: {from} is after {to}")]
    InvertedRange { from: NaiveDate, to: NaiveDate },

    #[error("timestamp out of range: {0}")]
    TimestampOutOfRange(i64),

    #[error("column '{0}' is required by the archive and cannot be changed")]
    RequiredColumn(String),

    #[error("column name '{0}' is reserved for the daily summary metadata")]
    ReservedColumn(String),
}
