//! The logging form and the dashboard it renders.
//!
//! `Logbook` holds the store handle explicitly. When the store cannot be
//! opened or read the dashboard falls back to an empty table and carries a
//! warning; submitting in that state fails with `StoreUnavailable`.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use log::{info, warn};
use serde::Serialize;

use crate::aggregator::{aggregate, BucketSummary, Granularity};
use crate::constants::{is_allowed_amount, ALLOWED_AMOUNTS_ML, MIN_WEIGHT_KG};
use crate::drinks::DrinkType;
use crate::entry::{parse_rows, LogEntry, StoredRow};
use crate::error::LogError;
use crate::estimator::{compute_metrics, format_clear_time, project_clear_time, Metrics};
use crate::store::LogStore;

/// The five form fields
#[derive(Debug, Clone, PartialEq)]
pub struct FormInput {
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub drink: DrinkType,
    pub amount_ml: u32,
}

impl FormInput {
    /// Form as first shown: today, default weight, first drink, default amount
    pub fn with_defaults(today: NaiveDate, weight_kg: f64, amount_ml: u32) -> Self {
        Self {
            date: today,
            weight_kg,
            drink: DrinkType::default(),
            amount_ml,
        }
    }

    /// Check the ranges the form enforces
    pub fn validate(&self) -> Result<(), LogError> {
        if !self.weight_kg.is_finite() || self.weight_kg < MIN_WEIGHT_KG {
            return Err(LogError::InvalidInput(format!(
                "weight must be at least {} kg, got {}",
                MIN_WEIGHT_KG, self.weight_kg
            )));
        }
        if !is_allowed_amount(self.amount_ml) {
            return Err(LogError::InvalidInput(format!(
                "amount must be one of {:?} ml, got {}",
                ALLOWED_AMOUNTS_ML, self.amount_ml
            )));
        }
        Ok(())
    }

    /// Grams and hours for the drink currently selected
    pub fn metrics(&self) -> Result<Metrics, LogError> {
        self.validate()?;
        compute_metrics(
            self.drink.strength_pct(),
            self.amount_ml as f64,
            self.weight_kg,
        )
    }

    /// Entry this form would append on submit
    pub fn to_entry(&self) -> LogEntry {
        LogEntry::new(self.date, self.drink, self.amount_ml)
    }
}

/// Parse a date field; a trailing time of day is accepted and dropped
pub fn parse_date_input(s: &str) -> Result<NaiveDate, LogError> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    Err(LogError::InvalidInput(format!(
        "date '{}' is not YYYY-MM-DD",
        s
    )))
}

/// The three chart series
#[derive(Debug, Clone, Default, Serialize)]
pub struct Charts {
    pub day: Vec<BucketSummary>,
    pub week: Vec<BucketSummary>,
    pub month: Vec<BucketSummary>,
}

impl Charts {
    pub fn from_entries(entries: &[LogEntry]) -> Self {
        Self {
            day: aggregate(entries, Granularity::Day),
            week: aggregate(entries, Granularity::Week),
            month: aggregate(entries, Granularity::Month),
        }
    }

    pub fn series(&self, granularity: Granularity) -> &[BucketSummary] {
        match granularity {
            Granularity::Day => &self.day,
            Granularity::Week => &self.week,
            Granularity::Month => &self.month,
        }
    }
}

/// Everything the output surface shows after a render
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub grams: f64,
    pub hours: f64,
    pub grams_display: String,
    pub hours_display: String,
    /// "HH:MM", local time
    pub clear_time: String,
    pub entry_count: usize,
    pub skipped_rows: usize,
    pub charts: Charts,
    /// User-visible warning when the store could not be used
    pub warning: Option<String>,
}

/// Snapshot of the stored log
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub entries: Vec<LogEntry>,
    pub skipped_rows: usize,
    pub warning: Option<String>,
}

/// Form session bound to one store handle
pub struct Logbook {
    store: Option<Box<dyn LogStore + Send>>,
    unavailable_reason: Option<String>,
}

impl Logbook {
    pub fn new(store: Box<dyn LogStore + Send>) -> Self {
        Self {
            store: Some(store),
            unavailable_reason: None,
        }
    }

    /// Logbook whose store could not be opened; reads are empty, writes fail
    pub fn unavailable(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!("Store unavailable, continuing with an empty log: {}", reason);
        Self {
            store: None,
            unavailable_reason: Some(reason),
        }
    }

    /// Open a store with `open`, degrading to `unavailable` on failure
    pub fn open_or_degrade<S, E, F>(open: F) -> Self
    where
        S: LogStore + Send + 'static,
        E: std::fmt::Display,
        F: FnOnce() -> Result<S, E>,
    {
        match open() {
            Ok(store) => Self::new(Box::new(store)),
            Err(e) => Self::unavailable(e.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    /// Read the full log; a failed read degrades to an empty snapshot
    pub fn snapshot(&mut self) -> Snapshot {
        let store = match self.store.as_mut() {
            Some(store) => store,
            None => {
                return Snapshot {
                    warning: self.unavailable_reason.clone().map(store_warning),
                    ..Snapshot::default()
                }
            }
        };
        match store.read_all() {
            Ok(rows) => {
                let parsed = parse_rows(&rows);
                Snapshot {
                    entries: parsed.entries,
                    skipped_rows: parsed.skipped,
                    warning: None,
                }
            }
            Err(e) => {
                warn!("Failed to read store: {}", e);
                Snapshot {
                    warning: Some(store_warning(e.to_string())),
                    ..Snapshot::default()
                }
            }
        }
    }

    /// Render the dashboard for the current form state
    pub fn render(&mut self, input: &FormInput, now: DateTime<Local>) -> Result<Dashboard, LogError> {
        let metrics = input.metrics()?;
        let snapshot = self.snapshot();
        Ok(build_dashboard(metrics, snapshot, now))
    }

    /// Append the form's entry: read all, push, write all back, re-read
    pub fn submit(&mut self, input: &FormInput, now: DateTime<Local>) -> Result<Dashboard, LogError> {
        let metrics = input.metrics()?;
        let store = match self.store.as_mut() {
            Some(store) => store,
            None => {
                return Err(LogError::StoreUnavailable(
                    self.unavailable_reason
                        .clone()
                        .unwrap_or_else(|| "no store configured".to_string()),
                ))
            }
        };

        let entry = input.to_entry();
        let lease = store.acquire()?;
        let mut table: Vec<StoredRow> = store.read_all()?;
        table.push(entry.to_row());
        let row_count = table.len();
        store.append_and_replace(table)?;
        lease.release();
        info!(
            "Saved {} ml of {} on {} ({:.1} g), log now has {} rows",
            entry.amount_ml, entry.drink_type, entry.date, entry.alcohol_grams, row_count
        );

        let snapshot = self.snapshot();
        Ok(build_dashboard(metrics, snapshot, now))
    }
}

fn store_warning(reason: String) -> String {
    format!("Could not reach the drink log store: {}", reason)
}

fn build_dashboard(metrics: Metrics, snapshot: Snapshot, now: DateTime<Local>) -> Dashboard {
    let clear_time = project_clear_time(metrics.hours, now);
    Dashboard {
        grams: metrics.grams,
        hours: metrics.hours,
        grams_display: metrics.grams_display(),
        hours_display: metrics.hours_display(),
        clear_time: format_clear_time(&clear_time),
        entry_count: snapshot.entries.len(),
        skipped_rows: snapshot.skipped_rows,
        charts: Charts::from_entries(&snapshot.entries),
        warning: snapshot.warning,
    }
}
