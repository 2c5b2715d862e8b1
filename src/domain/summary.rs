//! Daily summary accumulation

use chrono::NaiveDate;

/// Aggregate statistics of one observation over one day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DaySummary {
    pub min: Option<f64>,
    pub mintime: Option<i64>,
    pub max: Option<f64>,
    pub maxtime: Option<i64>,
    pub sum: f64,
    pub count: i64,
    /// Sum of value × interval seconds
    pub wsum: f64,
    /// Sum of interval seconds of counted values
    pub sumtime: i64,
}

impl DaySummary {
    /// Fold one value into the summary. Ties keep the earliest time.
    pub fn add(&mut self, timestamp: i64, value: f64, interval_minutes: i64) {
        if self.min.map_or(true, |m| value < m) {
            self.min = Some(value);
            self.mintime = Some(timestamp);
        }
        if self.max.map_or(true, |m| value > m) {
            self.max = Some(value);
            self.maxtime = Some(timestamp);
        }
        let seconds = interval_minutes * 60;
        self.sum += value;
        self.count += 1;
        self.wsum += value * seconds as f64;
        self.sumtime += seconds;
    }
}

/// Summaries of every observation column for one day.
#[derive(Debug, Clone)]
pub struct DayAccumulator {
    pub day: NaiveDate,
    /// One entry per observation, same order as the archive columns
    pub summaries: Vec<(String, DaySummary)>,
    pub records: usize,
}

impl DayAccumulator {
    pub fn new(day: NaiveDate, observations: &[String]) -> Self {
        Self {
            day,
            summaries: observations
                .iter()
                .map(|name| (name.clone(), DaySummary::default()))
                .collect(),
            records: 0,
        }
    }

    /// Fold in one archive record. `values` is aligned with the observations
    /// the accumulator was created with; `None` marks a missing value.
    pub fn add_record(&mut self, timestamp: i64, interval_minutes: i64, values: &[Option<f64>]) {
        self.records += 1;
        for ((_, summary), value) in self.summaries.iter_mut().zip(values) {
            if let Some(v) = value {
                summary.add(timestamp, *v, interval_minutes);
            }
        }
    }
}
