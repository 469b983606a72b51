//! Pure alcohol and metabolism time estimates.
//!
//! ```text
//! grams = amount_ml * (strength_pct / 100) * 0.8
//! hours = grams / (weight_kg * 0.1)
//! ```
//!
//! The clear time is projected from an explicit `now` so callers control the
//! clock. It is never stored: showing an old entry again yields a new clear
//! time based on the moment it is shown.

use chrono::{DateTime, Duration, TimeZone};
use serde::Serialize;

use crate::constants::{ABSORPTION_COEFFICIENT, CLEARANCE_RATE_PER_KG};
use crate::error::LogError;

/// Result of a single estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    /// Grams of pure alcohol
    pub grams: f64,
    /// Hours until the alcohol is metabolised
    pub hours: f64,
}

impl Metrics {
    /// Grams with one decimal, e.g. "14.0 g"
    pub fn grams_display(&self) -> String {
        format!("{:.1} g", self.grams)
    }

    /// Hours with one decimal, e.g. "2.2 h"
    pub fn hours_display(&self) -> String {
        format!("{:.1} h", self.hours)
    }
}

/// Grams of pure alcohol in `amount_ml` of a drink at `strength_pct`
pub fn pure_alcohol_grams(strength_pct: f64, amount_ml: f64) -> f64 {
    amount_ml * (strength_pct / 100.0) * ABSORPTION_COEFFICIENT
}

/// Hours needed to metabolise `grams` at `weight_kg`
pub fn metabolism_hours(grams: f64, weight_kg: f64) -> Result<f64, LogError> {
    let clearance_per_hour = weight_kg * CLEARANCE_RATE_PER_KG;
    if clearance_per_hour == 0.0 {
        return Err(LogError::DivisionUndefined);
    }
    Ok(grams / clearance_per_hour)
}

/// Compute grams and hours for one drink
pub fn compute_metrics(
    strength_pct: f64,
    amount_ml: f64,
    weight_kg: f64,
) -> Result<Metrics, LogError> {
    let grams = pure_alcohol_grams(strength_pct, amount_ml);
    let hours = metabolism_hours(grams, weight_kg)?;
    Ok(Metrics { grams, hours })
}

/// Wall-clock time at which `hours` will have elapsed after `now`
pub fn project_clear_time<Tz: TimeZone>(hours: f64, now: DateTime<Tz>) -> DateTime<Tz> {
    let millis = (hours * 3_600_000.0).round() as i64;
    now + Duration::milliseconds(millis)
}

/// Format a clear time as zero-padded 24-hour "HH:MM"
pub fn format_clear_time<Tz: TimeZone>(clear_time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    clear_time.format("%H:%M").to_string()
}
