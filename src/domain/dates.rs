//! Archive days and rebuild ranges
//!
//! Archive timestamps mark the END of an interval, so a record stamped
//! exactly at midnight belongs to the day that just ended. Days are UTC.

use chrono::{DateTime, NaiveDate, NaiveTime};

use crate::domain::DomainError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-mm-dd` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| DomainError::InvalidDate(value.to_string()))
}

/// Epoch seconds of midnight starting `day`.
pub fn day_start(day: NaiveDate) -> i64 {
    day.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Epoch seconds of midnight ending `day`.
pub fn day_end(day: NaiveDate) -> i64 {
    match day.succ_opt() {
        Some(next) => day_start(next),
        None => i64::MAX,
    }
}

/// Day an archive record stamped `timestamp` belongs to.
pub fn day_of(timestamp: i64) -> Result<NaiveDate, DomainError> {
    timestamp
        .checked_sub(1)
        .and_then(|t| DateTime::from_timestamp(t, 0))
        .map(|dt| dt.date_naive())
        .ok_or(DomainError::TimestampOutOfRange(timestamp))
}

/// Which days a daily summary rebuild covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildRange {
    /// Every day with archive data
    All,
    /// One day only
    Day(NaiveDate),
    /// Inclusive span; an open end extends to the first/last archive day
    Span {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl RebuildRange {
    /// Build a range from the `--date`/`--from`/`--to` options.
    pub fn from_options(
        date: Option<NaiveDate>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Self, DomainError> {
        match (date, from, to) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(DomainError::ConflictingDates),
            (Some(day), None, None) => Ok(RebuildRange::Day(day)),
            (None, None, None) => Ok(RebuildRange::All),
            (None, Some(from), Some(to)) if from > to => {
                Err(DomainError::InvertedRange { from, to })
            }
            (None, from, to) => Ok(RebuildRange::Span { from, to }),
        }
    }

    /// Concrete first and last day, given the days of the first and last
    /// archive records. `None` when the range holds no archive data.
    pub fn clamp(&self, first: NaiveDate, last: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let (start, end) = match *self {
            RebuildRange::All => (first, last),
            RebuildRange::Day(day) => (day, day),
            RebuildRange::Span { from, to } => {
                (from.unwrap_or(first).max(first), to.unwrap_or(last).min(last))
            }
        };
        (start <= end && start <= last && end >= first).then_some((start, end))
    }

    /// Summary rows to clear before rebuilding, as `[start, end)` day starts.
    /// `None` clears every row. Open ends are unbounded, so stale rows for
    /// days without archive data are cleared too.
    pub fn clear_window(&self) -> Option<(i64, i64)> {
        match *self {
            RebuildRange::All => None,
            RebuildRange::Day(day) => Some((day_start(day), day_end(day))),
            RebuildRange::Span { from, to } => Some((
                from.map_or(i64::MIN, day_start),
                to.map_or(i64::MAX, day_end),
            )),
        }
    }
}
