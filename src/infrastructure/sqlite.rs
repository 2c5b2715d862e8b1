//! SQLite access for archive databases
//!
//! Thin wrappers over `rusqlite`. Every function takes a `&Connection`, so
//! callers can pass a `Transaction` (which derefs to one) and decide at
//! the end whether to commit or roll back.

use std::path::Path;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row, Statement, Transaction};
use tracing::{debug, trace};

use crate::domain::column::quote_ident;
use crate::domain::schema;
use crate::domain::{ColumnSpec, ColumnType, DaySummary};

/// Handle on one archive database file.
pub struct ArchiveDb {
    conn: Connection,
}

impl ArchiveDb {
    /// Open an existing database. Never creates the file.
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        debug!("open: {}", path.display());
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Open the database, creating the file if needed.
    pub fn create(path: &Path) -> rusqlite::Result<Self> {
        debug!("create: {}", path.display());
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn transaction(&mut self) -> rusqlite::Result<Transaction<'_>> {
        self.conn.transaction()
    }
}

/// Run one or more DDL/DML statements.
pub fn execute(conn: &Connection, sql: &str) -> rusqlite::Result<()> {
    debug!("sql: {}", sql);
    conn.execute_batch(sql)
}

pub fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Columns of `table` in declaration order.
pub fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<ColumnSpec>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
    let rows = stmt.query_map([], |row| {
        let name: String = row.get("name")?;
        let declared: String = row.get("type")?;
        Ok(ColumnSpec::new(
            name,
            declared.parse::<ColumnType>().unwrap_or_default(),
        ))
    })?;
    rows.collect()
}

/// Daily summary tables of `table`, metadata included, sorted by name.
pub fn summary_tables(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let prefix = schema::summary_prefix(table);
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND lower(substr(name, 1, ?1)) = lower(?2) \
         ORDER BY name",
    )?;
    let rows = stmt.query_map(params![prefix.chars().count() as i64, prefix], |row| row.get(0))?;
    rows.collect()
}

pub fn read_metadata(conn: &Connection, table: &str, name: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        &format!(
            "SELECT value FROM {} WHERE name = ?1",
            quote_ident(&schema::metadata_table(table))
        ),
        params![name],
        |row| row.get(0),
    )
    .optional()
}

pub fn write_metadata(conn: &Connection, table: &str, name: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO {} (name, value) VALUES (?1, ?2)",
            quote_ident(&schema::metadata_table(table))
        ),
        params![name, value],
    )?;
    Ok(())
}

/// Timestamps of the oldest and newest archive records.
pub fn archive_bounds(conn: &Connection, table: &str) -> rusqlite::Result<Option<(i64, i64)>> {
    let (first, last): (Option<i64>, Option<i64>) = conn.query_row(
        &format!(
            "SELECT MIN({col}), MAX({col}) FROM {}",
            quote_ident(table),
            col = quote_ident("dateTime")
        ),
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(first.zip(last))
}

/// Delete summary rows whose day start lies in `[start, end)`, or all rows.
pub fn delete_summary_rows(
    conn: &Connection,
    day_table: &str,
    window: Option<(i64, i64)>,
) -> rusqlite::Result<usize> {
    match window {
        Some((start, end)) => conn.execute(
            &format!(
                "DELETE FROM {} WHERE dateTime >= ?1 AND dateTime < ?2",
                quote_ident(day_table)
            ),
            params![start, end],
        ),
        None => conn.execute(&format!("DELETE FROM {}", quote_ident(day_table)), []),
    }
}

pub fn insert_summary(
    conn: &Connection,
    day_table: &str,
    day_start: i64,
    summary: &DaySummary,
) -> rusqlite::Result<()> {
    trace!("insert {} @ {}: {:?}", day_table, day_start, summary);
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO {} \
             (dateTime, min, mintime, max, maxtime, sum, count, wsum, sumtime) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            quote_ident(day_table)
        ),
        params![
            day_start,
            summary.min,
            summary.mintime,
            summary.max,
            summary.maxtime,
            summary.sum,
            summary.count,
            summary.wsum,
            summary.sumtime,
        ],
    )?;
    Ok(())
}

/// One archive row, observations aligned with the query's column list.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveRecord {
    pub timestamp: i64,
    /// Minutes
    pub interval: i64,
    pub values: Vec<Option<f64>>,
}

/// Statement selecting records with `?1 < dateTime <= ?2`, oldest first.
pub fn prepare_records<'c>(
    conn: &'c Connection,
    table: &str,
    observations: &[String],
) -> rusqlite::Result<Statement<'c>> {
    let mut columns = vec![quote_ident("dateTime"), quote_ident("interval")];
    columns.extend(observations.iter().map(|o| quote_ident(o)));
    let sql = format!(
        "SELECT {} FROM {} WHERE {dt} > ?1 AND {dt} <= ?2 ORDER BY {dt} ASC",
        columns.join(", "),
        quote_ident(table),
        dt = quote_ident("dateTime")
    );
    debug!("sql: {}", sql);
    conn.prepare(&sql)
}

pub fn read_record(row: &Row<'_>, observations: usize) -> rusqlite::Result<ArchiveRecord> {
    let values = (0..observations)
        .map(|i| row.get::<_, Option<f64>>(i + 2))
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ArchiveRecord {
        timestamp: row.get(0)?,
        interval: row.get(1)?,
        values,
    })
}

/// Commit, or roll back when `dry_run` is set.
pub fn finish(tx: Transaction<'_>, dry_run: bool) -> rusqlite::Result<()> {
    if dry_run {
        debug!("dry run: rolling back");
        tx.rollback()
    } else {
        tx.commit()
    }
}
