//! # Aggregation Tests
//!
//! Checks the chart totals over a full year of generated entries using only
//! the public API.
//!
//! ## Running the Tests
//!
//! ```bash
//! cargo test --test aggregate_test
//! ```

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use drink_log::constants::ALLOWED_AMOUNTS_ML;
use drink_log::{aggregate, compute_metrics, DrinkType, Granularity, LogEntry};

/// A year of entries, some days with several drinks and some with none
fn year_of_entries() -> Vec<LogEntry> {
    let start = NaiveDate::from_ymd_opt(2023, 12, 25).unwrap();
    let mut entries = Vec::new();
    for day in 0..380i64 {
        let date = start + Duration::days(day);
        let drinks_today = (day * 7 % 5) as usize;
        for n in 0..drinks_today {
            let drink = DrinkType::ALL[(day as usize + n) % DrinkType::ALL.len()];
            let amount = ALLOWED_AMOUNTS_ML[(day as usize * 3 + n) % ALLOWED_AMOUNTS_ML.len()];
            entries.push(LogEntry::new(date, drink, amount));
        }
    }
    entries
}

#[test]
fn test_totals_are_conserved_for_every_granularity() {
    let entries = year_of_entries();
    let expected: f64 = entries.iter().map(|e| e.alcohol_grams).sum();
    assert!(expected > 0.0);

    for granularity in Granularity::ALL {
        let total: f64 = aggregate(&entries, granularity)
            .iter()
            .map(|b| b.total_alcohol_grams)
            .sum();
        assert!(
            (total - expected).abs() < 1e-6,
            "{}: {} != {}",
            granularity,
            total,
            expected
        );
    }
}

#[test]
fn test_bucket_keys_are_aligned_and_ascending() {
    let entries = year_of_entries();

    for granularity in Granularity::ALL {
        let buckets = aggregate(&entries, granularity);
        assert!(buckets
            .windows(2)
            .all(|w| w[0].bucket_start < w[1].bucket_start));
        for bucket in &buckets {
            match granularity {
                Granularity::Day => {}
                Granularity::Week => assert_eq!(bucket.bucket_start.weekday(), Weekday::Mon),
                Granularity::Month => assert_eq!(bucket.bucket_start.day(), 1),
            }
        }
    }
}

#[test]
fn test_coarser_buckets_never_outnumber_days() {
    let entries = year_of_entries();
    let days = aggregate(&entries, Granularity::Day).len();
    let weeks = aggregate(&entries, Granularity::Week).len();
    let months = aggregate(&entries, Granularity::Month).len();

    assert!(weeks <= days);
    assert!(months <= days);
    // 2023-12-25 .. 2025-01-07 touches 14 calendar months
    assert_eq!(months, 14);
}

#[test]
fn test_input_order_does_not_change_buckets() {
    let entries = year_of_entries();
    let mut reversed = entries.clone();
    reversed.reverse();

    for granularity in Granularity::ALL {
        let a = aggregate(&entries, granularity);
        let b = aggregate(&reversed, granularity);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.bucket_start, y.bucket_start);
            assert!((x.total_alcohol_grams - y.total_alcohol_grams).abs() < 1e-9);
        }
    }
}

#[test]
fn test_stored_grams_match_estimator() {
    for drink in DrinkType::ALL {
        for amount in ALLOWED_AMOUNTS_ML {
            let entry = LogEntry::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), drink, amount);
            let metrics = compute_metrics(drink.strength_pct(), amount as f64, 65.0).unwrap();
            assert_eq!(entry.alcohol_grams, metrics.grams);
        }
    }
}
