//! Archive and daily summary table layout
//!
//! The archive table holds one row per archive interval. Each observation
//! column `obs` gets a daily summary table `<table>_day_<obs>`, and the
//! summaries share a metadata table `<table>_day__metadata`.

use crate::domain::column::{quote_ident, ColumnSpec, ColumnType};
use crate::domain::DomainError;

/// Table name used when a binding does not name one.
pub const DEFAULT_TABLE_NAME: &str = "archive";

/// Version stamp written into the summary metadata.
pub const SUMMARY_VERSION: &str = "4.0";

pub const META_VERSION: &str = "Version";
pub const META_LAST_UPDATE: &str = "lastUpdate";

/// Observation columns of a freshly created archive.
pub fn default_observations() -> Vec<ColumnSpec> {
    [
        "barometer",
        "pressure",
        "altimeter",
        "inTemp",
        "outTemp",
        "inHumidity",
        "outHumidity",
        "windSpeed",
        "windDir",
        "windGust",
        "windGustDir",
        "rainRate",
        "rain",
        "dewpoint",
        "windchill",
        "heatindex",
        "ET",
        "radiation",
        "UV",
    ]
    .into_iter()
    .map(ColumnSpec::real)
    .collect()
}

/// Prefix shared by every daily summary table of `table`.
pub fn summary_prefix(table: &str) -> String {
    format!("{table}_day_")
}

pub fn metadata_table(table: &str) -> String {
    format!("{table}_day__metadata")
}

pub fn day_table(table: &str, obs: &str) -> String {
    format!("{table}_day_{obs}")
}

/// Reject an observation name whose summary table would be the metadata table.
pub fn ensure_summary_name_free(table: &str, obs: &str) -> Result<(), DomainError> {
    if day_table(table, obs).eq_ignore_ascii_case(&metadata_table(table)) {
        Err(DomainError::ReservedColumn(obs.to_string()))
    } else {
        Ok(())
    }
}

pub fn create_archive_sql(table: &str, observations: &[ColumnSpec]) -> String {
    let mut columns = vec![
        format!("{} INTEGER NOT NULL UNIQUE PRIMARY KEY", quote_ident("dateTime")),
        format!("{} INTEGER NOT NULL", quote_ident("usUnits")),
        format!("{} INTEGER NOT NULL", quote_ident("interval")),
    ];
    columns.extend(
        observations
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.column_type.as_sql())),
    );
    format!(
        "CREATE TABLE {} ({});",
        quote_ident(table),
        columns.join(", ")
    )
}

pub fn create_metadata_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (name TEXT NOT NULL UNIQUE PRIMARY KEY, value TEXT);",
        quote_ident(&metadata_table(table))
    )
}

pub fn create_day_table_sql(table: &str, obs: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\
         dateTime INTEGER NOT NULL UNIQUE PRIMARY KEY, \
         min REAL, mintime INTEGER, max REAL, maxtime INTEGER, \
         sum REAL, count INTEGER, wsum REAL, sumtime INTEGER);",
        quote_ident(&day_table(table, obs))
    )
}

pub fn add_column_sql(table: &str, name: &str, column_type: ColumnType) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN {} {};",
        quote_ident(table),
        quote_ident(name),
        column_type.as_sql()
    )
}

pub fn rename_column_sql(table: &str, from: &str, to: &str) -> String {
    format!(
        "ALTER TABLE {} RENAME COLUMN {} TO {};",
        quote_ident(table),
        quote_ident(from),
        quote_ident(to)
    )
}

pub fn drop_column_sql(table: &str, name: &str) -> String {
    format!(
        "ALTER TABLE {} DROP COLUMN {};",
        quote_ident(table),
        quote_ident(name)
    )
}

pub fn rename_table_sql(from: &str, to: &str) -> String {
    format!(
        "ALTER TABLE {} RENAME TO {};",
        quote_ident(from),
        quote_ident(to)
    )
}

pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {};", quote_ident(table))
}
