//! Database action provider contract
//!
//! The CLI forwards every `database` subcommand to exactly one method of
//! [`DatabaseActions`]. Each method returns a report of what was done, or
//! in dry-run mode, what would have been done.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::application::ApplicationResult;
use crate::domain::ColumnType;

/// Binding used when none is given.
pub const DEFAULT_BINDING: &str = "wx_binding";

/// Which database an action runs against, and whether it may mutate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Config file; `None` means the default location
    pub config: Option<PathBuf>,
    pub binding: String,
    pub dry_run: bool,
}

impl Target {
    pub fn new(binding: impl Into<String>) -> Self {
        Self {
            config: None,
            binding: binding.into(),
            dry_run: false,
        }
    }

    pub fn with_config(mut self, config: impl Into<PathBuf>) -> Self {
        self.config = Some(config.into());
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReport {
    pub database: PathBuf,
    pub table: String,
    /// Observation columns (excluding the required ones)
    pub columns: usize,
    pub summary_tables: usize,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropDailyReport {
    pub database: PathBuf,
    pub dropped: Vec<String>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildReport {
    pub database: PathBuf,
    /// First and last day rebuilt; `None` when no archive data was in range
    pub span: Option<(NaiveDate, NaiveDate)>,
    pub days: usize,
    pub records: usize,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddColumnReport {
    pub table: String,
    pub column: String,
    pub column_type: ColumnType,
    pub summary_added: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameColumnReport {
    pub table: String,
    pub from: String,
    pub to: String,
    pub summary_renamed: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropColumnsReport {
    pub table: String,
    pub dropped: Vec<String>,
    /// Requested names not present in the table
    pub skipped: Vec<String>,
    pub dry_run: bool,
}

/// Operations the `database` command group dispatches to.
pub trait DatabaseActions {
    /// Create the archive and daily summaries for the binding.
    fn create_database(&self, target: &Target) -> ApplicationResult<CreateReport>;

    /// Drop all daily summary tables.
    fn drop_daily(&self, target: &Target) -> ApplicationResult<DropDailyReport>;

    /// Recompute daily summaries. `date` and `from_date`/`to_date` are
    /// mutually exclusive; no dates means every day.
    fn rebuild_daily(
        &self,
        target: &Target,
        date: Option<NaiveDate>,
        from_date: Option<NaiveDate>,
        to_date: Option<NaiveDate>,
    ) -> ApplicationResult<RebuildReport>;

    fn add_column(
        &self,
        target: &Target,
        column_name: &str,
        column_type: ColumnType,
    ) -> ApplicationResult<AddColumnReport>;

    fn rename_column(
        &self,
        target: &Target,
        column_name: &str,
        new_name: &str,
    ) -> ApplicationResult<RenameColumnReport>;

    fn drop_columns(
        &self,
        target: &Target,
        column_names: &[String],
    ) -> ApplicationResult<DropColumnsReport>;
}
