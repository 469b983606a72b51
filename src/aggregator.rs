//! Group-by-bucket sums of logged alcohol for the day, week and month charts.
//!
//! Weeks start on Monday. Buckets without entries are left out.

use chrono::{Datelike, Duration, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::entry::LogEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One bucket per calendar day
    Day,
    /// One bucket per Monday-starting week
    Week,
    /// One bucket per calendar month
    Month,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Day, Granularity::Week, Granularity::Month];

    /// First date of the bucket containing `date`
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Week => {
                date - Duration::days(date.weekday().num_days_from_monday() as i64)
            }
            Granularity::Month => date.with_day(1).unwrap_or(date),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bar of a chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub bucket_start: NaiveDate,
    pub total_alcohol_grams: f64,
}

/// Sum grams per bucket, ascending by bucket start
///
/// Sums are accumulated in input order so results are reproducible.
pub fn aggregate(entries: &[LogEntry], granularity: Granularity) -> Vec<BucketSummary> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for entry in entries {
        *buckets
            .entry(granularity.bucket_start(entry.date))
            .or_insert(0.0) += entry.alcohol_grams;
    }
    buckets
        .into_iter()
        .map(|(bucket_start, total_alcohol_grams)| BucketSummary {
            bucket_start,
            total_alcohol_grams,
        })
        .collect()
}
