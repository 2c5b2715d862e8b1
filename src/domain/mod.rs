//! Domain layer: archive schema, dates and daily aggregation
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod column;
pub mod dates;
pub mod error;
pub mod schema;
pub mod summary;

pub use column::{ColumnSpec, ColumnType, REQUIRED_COLUMNS};
pub use dates::RebuildRange;
pub use error::DomainError;
pub use summary::{DayAccumulator, DaySummary};

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
