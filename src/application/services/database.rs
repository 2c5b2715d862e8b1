//! Archive database service
//!
//! SQLite implementation of [`DatabaseActions`]. Every action runs in a
//! single transaction; dry runs roll it back so the report is exact but
//! nothing is persisted.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use tracing::{debug, instrument};

use crate::application::actions::{
    AddColumnReport, CreateReport, DatabaseActions, DropColumnsReport, DropDailyReport,
    RebuildReport, RenameColumnReport, Target,
};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt, SqlResultExt};
use crate::config::{ResolvedBinding, Settings};
use crate::domain::column::{ensure_mutable_column, same_column, validate_column_name};
use crate::domain::dates::{self, RebuildRange};
use crate::domain::schema::{self, META_LAST_UPDATE, META_VERSION, SUMMARY_VERSION};
use crate::domain::{ColumnSpec, ColumnType, DayAccumulator};
use crate::infrastructure::sqlite::{self, ArchiveDb};

/// Service performing maintenance actions on SQLite archive databases.
pub struct DatabaseService {
    /// Config file used when a request names none
    default_config: Option<PathBuf>,
}

impl DatabaseService {
    /// Create a new database service.
    pub fn new(default_config: Option<PathBuf>) -> Self {
        Self { default_config }
    }

    fn settings(&self, target: &Target) -> ApplicationResult<Settings> {
        match &target.config {
            Some(path) => Settings::load(path),
            None => Settings::load_default(self.default_config.as_deref()),
        }
    }

    fn resolve(&self, target: &Target) -> ApplicationResult<ResolvedBinding> {
        self.settings(target)?.resolve_binding(&target.binding)
    }

    fn open_existing(binding: &ResolvedBinding) -> ApplicationResult<ArchiveDb> {
        if !binding.database.is_file() {
            return Err(ApplicationError::DatabaseNotFound(binding.database.clone()));
        }
        ArchiveDb::open(&binding.database)
            .with_db_context(&format!("open {}", binding.database.display()))
    }

    /// Columns of the binding's archive table; fails if the table is missing.
    fn archive_columns(
        conn: &Connection,
        binding: &ResolvedBinding,
    ) -> ApplicationResult<Vec<ColumnSpec>> {
        if !sqlite::table_exists(conn, &binding.table_name).with_db_context("inspect schema")? {
            return Err(ApplicationError::TableNotFound {
                table: binding.table_name.clone(),
                database: binding.database.clone(),
            });
        }
        sqlite::table_columns(conn, &binding.table_name)
            .with_db_context(&format!("read columns of {}", binding.table_name))
    }

    /// Create the metadata table and one summary table per observation.
    fn create_summaries(
        conn: &Connection,
        table: &str,
        observations: &[String],
    ) -> ApplicationResult<()> {
        sqlite::execute(conn, &schema::create_metadata_sql(table))
            .with_db_context("create summary metadata")?;
        if sqlite::read_metadata(conn, table, META_VERSION)
            .with_db_context("read summary version")?
            .is_none()
        {
            sqlite::write_metadata(conn, table, META_VERSION, SUMMARY_VERSION)
                .with_db_context("write summary version")?;
        }
        for obs in observations {
            sqlite::execute(conn, &schema::create_day_table_sql(table, obs))
                .with_db_context(&format!("create summary for {obs}"))?;
        }
        Ok(())
    }

    /// Re-aggregate archive records of `[start, end]` into the summary tables.
    /// Returns `(days, records)`.
    fn aggregate(
        conn: &Connection,
        table: &str,
        observations: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ApplicationResult<(usize, usize)> {
        let mut stmt = sqlite::prepare_records(conn, table, observations)
            .with_db_context("prepare archive query")?;
        let mut rows = stmt
            .query(params![dates::day_start(start), dates::day_end(end)])
            .with_db_context("query archive records")?;

        let mut current: Option<DayAccumulator> = None;
        let (mut days, mut records) = (0, 0);

        while let Some(row) = rows.next().with_db_context("read archive record")? {
            let record = sqlite::read_record(row, observations.len())
                .with_db_context("decode archive record")?;
            let day = dates::day_of(record.timestamp)?;

            if current.as_ref().is_some_and(|acc| acc.day != day) {
                if let Some(done) = current.take() {
                    Self::write_day(conn, table, &done)?;
                    days += 1;
                    records += done.records;
                }
            }
            current
                .get_or_insert_with(|| DayAccumulator::new(day, observations))
                .add_record(record.timestamp, record.interval, &record.values);
        }
        if let Some(done) = current {
            Self::write_day(conn, table, &done)?;
            days += 1;
            records += done.records;
        }
        Ok((days, records))
    }

    fn write_day(conn: &Connection, table: &str, acc: &DayAccumulator) -> ApplicationResult<()> {
        let start = dates::day_start(acc.day);
        for (obs, summary) in &acc.summaries {
            sqlite::insert_summary(conn, &schema::day_table(table, obs), start, summary)
                .with_db_context(&format!("write {} summary for {}", obs, acc.day))?;
        }
        Ok(())
    }
}

fn observation_names(columns: &[ColumnSpec]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| !crate::domain::column::is_required_column(&c.name))
        .map(|c| c.name.clone())
        .collect()
}

fn ensure_parent_dir(path: &Path) -> ApplicationResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_path_context("create database directory", parent)?;
        }
    }
    Ok(())
}

impl DatabaseActions for DatabaseService {
    #[instrument(skip(self))]
    fn create_database(&self, target: &Target) -> ApplicationResult<CreateReport> {
        let binding = self.resolve(target)?;
        let table = binding.table_name.as_str();
        let observations = schema::default_observations();
        let obs_names: Vec<String> = observations.iter().map(|c| c.name.clone()).collect();
        let report = CreateReport {
            database: binding.database.clone(),
            table: table.to_string(),
            columns: observations.len(),
            summary_tables: observations.len(),
            dry_run: target.dry_run,
        };

        let exists = binding.database.is_file();
        if exists {
            let db = Self::open_existing(&binding)?;
            if sqlite::table_exists(db.connection(), table).with_db_context("inspect schema")? {
                return Err(ApplicationError::DatabaseExists(binding.database.clone()));
            }
        } else if target.dry_run {
            debug!("dry run: would create {}", binding.database.display());
            return Ok(report);
        } else {
            ensure_parent_dir(&binding.database)?;
        }

        let mut db = ArchiveDb::create(&binding.database)
            .with_db_context(&format!("create {}", binding.database.display()))?;
        let tx = db.transaction().with_db_context("begin transaction")?;
        sqlite::execute(&tx, &schema::create_archive_sql(table, &observations))
            .with_db_context(&format!("create table {table}"))?;
        Self::create_summaries(&tx, table, &obs_names)?;
        sqlite::finish(tx, target.dry_run).with_db_context("finish transaction")?;

        debug!("create_database: {} ({})", binding.database.display(), table);
        Ok(report)
    }

    #[instrument(skip(self))]
    fn drop_daily(&self, target: &Target) -> ApplicationResult<DropDailyReport> {
        let binding = self.resolve(target)?;
        let mut db = Self::open_existing(&binding)?;
        let tx = db.transaction().with_db_context("begin transaction")?;

        let dropped = sqlite::summary_tables(&tx, &binding.table_name)
            .with_db_context("list summary tables")?;
        for table in &dropped {
            sqlite::execute(&tx, &schema::drop_table_sql(table))
                .with_db_context(&format!("drop {table}"))?;
        }
        sqlite::finish(tx, target.dry_run).with_db_context("finish transaction")?;

        debug!("drop_daily: {} tables", dropped.len());
        Ok(DropDailyReport {
            database: binding.database,
            dropped,
            dry_run: target.dry_run,
        })
    }

    #[instrument(skip(self))]
    fn rebuild_daily(
        &self,
        target: &Target,
        date: Option<NaiveDate>,
        from_date: Option<NaiveDate>,
        to_date: Option<NaiveDate>,
    ) -> ApplicationResult<RebuildReport> {
        let range = RebuildRange::from_options(date, from_date, to_date)?;
        let binding = self.resolve(target)?;
        let table = binding.table_name.as_str();
        let mut db = Self::open_existing(&binding)?;
        let tx = db.transaction().with_db_context("begin transaction")?;

        let observations = observation_names(&Self::archive_columns(&tx, &binding)?);
        Self::create_summaries(&tx, table, &observations)?;

        let bounds = sqlite::archive_bounds(&tx, table).with_db_context("read archive bounds")?;
        let span = match bounds {
            Some((first, last)) => range.clamp(dates::day_of(first)?, dates::day_of(last)?),
            None => None,
        };
        debug!("rebuild_daily: range={:?} span={:?}", range, span);

        let window = range.clear_window();
        for obs in &observations {
            sqlite::delete_summary_rows(&tx, &schema::day_table(table, obs), window)
                .with_db_context(&format!("clear {obs} summary"))?;
        }

        let (days, records) = match span {
            Some((start, end)) => Self::aggregate(&tx, table, &observations, start, end)?,
            None => (0, 0),
        };
        if let Some((_, last)) = bounds {
            sqlite::write_metadata(&tx, table, META_LAST_UPDATE, &last.to_string())
                .with_db_context("write lastUpdate")?;
        }
        sqlite::finish(tx, target.dry_run).with_db_context("finish transaction")?;

        Ok(RebuildReport {
            database: binding.database,
            span,
            days,
            records,
            dry_run: target.dry_run,
        })
    }

    #[instrument(skip(self))]
    fn add_column(
        &self,
        target: &Target,
        column_name: &str,
        column_type: ColumnType,
    ) -> ApplicationResult<AddColumnReport> {
        validate_column_name(column_name)?;
        let binding = self.resolve(target)?;
        let table = binding.table_name.as_str();
        schema::ensure_summary_name_free(table, column_name)?;
        let mut db = Self::open_existing(&binding)?;
        let tx = db.transaction().with_db_context("begin transaction")?;

        let columns = Self::archive_columns(&tx, &binding)?;
        if columns.iter().any(|c| same_column(&c.name, column_name)) {
            return Err(ApplicationError::ColumnExists(column_name.to_string()));
        }
        sqlite::execute(&tx, &schema::add_column_sql(table, column_name, column_type))
            .with_db_context(&format!("add column {column_name}"))?;

        let summary_added = sqlite::table_exists(&tx, &schema::metadata_table(table))
            .with_db_context("inspect schema")?;
        if summary_added {
            sqlite::execute(&tx, &schema::create_day_table_sql(table, column_name))
                .with_db_context(&format!("create summary for {column_name}"))?;
        }
        sqlite::finish(tx, target.dry_run).with_db_context("finish transaction")?;

        Ok(AddColumnReport {
            table: table.to_string(),
            column: column_name.to_string(),
            column_type,
            summary_added,
            dry_run: target.dry_run,
        })
    }

    #[instrument(skip(self))]
    fn rename_column(
        &self,
        target: &Target,
        column_name: &str,
        new_name: &str,
    ) -> ApplicationResult<RenameColumnReport> {
        ensure_mutable_column(column_name)?;
        validate_column_name(new_name)?;
        let binding = self.resolve(target)?;
        let table = binding.table_name.as_str();
        schema::ensure_summary_name_free(table, new_name)?;
        let mut db = Self::open_existing(&binding)?;
        let tx = db.transaction().with_db_context("begin transaction")?;

        let columns = Self::archive_columns(&tx, &binding)?;
        let old = columns
            .iter()
            .find(|c| same_column(&c.name, column_name))
            .map(|c| c.name.clone())
            .ok_or_else(|| ApplicationError::ColumnNotFound(column_name.to_string()))?;
        if columns.iter().any(|c| same_column(&c.name, new_name)) {
            return Err(ApplicationError::ColumnExists(new_name.to_string()));
        }
        sqlite::execute(&tx, &schema::rename_column_sql(table, &old, new_name))
            .with_db_context(&format!("rename column {old}"))?;

        let old_summary = schema::day_table(table, &old);
        let new_summary = schema::day_table(table, new_name);
        let summary_renamed =
            sqlite::table_exists(&tx, &old_summary).with_db_context("inspect schema")?;
        if summary_renamed {
            // a summary under the new name can only be a leftover
            sqlite::execute(&tx, &schema::drop_table_sql(&new_summary))
                .with_db_context(&format!("drop stale {new_summary}"))?;
            sqlite::execute(&tx, &schema::rename_table_sql(&old_summary, &new_summary))
                .with_db_context(&format!("rename {old_summary}"))?;
        }
        sqlite::finish(tx, target.dry_run).with_db_context("finish transaction")?;

        Ok(RenameColumnReport {
            table: table.to_string(),
            from: old,
            to: new_name.to_string(),
            summary_renamed,
            dry_run: target.dry_run,
        })
    }

    #[instrument(skip(self))]
    fn drop_columns(
        &self,
        target: &Target,
        column_names: &[String],
    ) -> ApplicationResult<DropColumnsReport> {
        for name in column_names {
            ensure_mutable_column(name)?;
        }
        let binding = self.resolve(target)?;
        let table = binding.table_name.as_str();
        let mut db = Self::open_existing(&binding)?;
        let tx = db.transaction().with_db_context("begin transaction")?;

        let columns = Self::archive_columns(&tx, &binding)?;
        let mut dropped: Vec<String> = Vec::new();
        let mut skipped: Vec<String> = Vec::new();
        for name in column_names {
            match columns.iter().find(|c| same_column(&c.name, name)) {
                Some(c) if !dropped.contains(&c.name) => dropped.push(c.name.clone()),
                Some(_) => {}
                None if !skipped.contains(name) => skipped.push(name.clone()),
                None => {}
            }
        }

        for name in &dropped {
            sqlite::execute(&tx, &schema::drop_column_sql(table, name))
                .with_db_context(&format!("drop column {name}"))?;
            sqlite::execute(&tx, &schema::drop_table_sql(&schema::day_table(table, name)))
                .with_db_context(&format!("drop summary for {name}"))?;
        }
        sqlite::finish(tx, target.dry_run || dropped.is_empty())
            .with_db_context("finish transaction")?;

        debug!("drop_columns: dropped={:?} skipped={:?}", dropped, skipped);
        Ok(DropColumnsReport {
            table: table.to_string(),
            dropped,
            skipped,
            dry_run: target.dry_run,
        })
    }
}
