//! Plain-text bar charts for the terminal.

use crate::aggregator::{BucketSummary, Granularity};
use crate::form::Dashboard;

const BAR_WIDTH: usize = 40;

/// Render one series as horizontal bars scaled to the largest bucket
pub fn render_bars(title: &str, series: &[BucketSummary]) -> String {
    let mut out = format!("{}\n", title);
    if series.is_empty() {
        out.push_str("  (no entries)\n");
        return out;
    }

    let max = series
        .iter()
        .map(|b| b.total_alcohol_grams)
        .fold(0.0_f64, f64::max);

    for bucket in series {
        let len = if max > 0.0 {
            ((bucket.total_alcohol_grams / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "  {}  {:<width$}  {:.1} g\n",
            bucket.bucket_start.format("%Y-%m-%d"),
            "#".repeat(len),
            bucket.total_alcohol_grams,
            width = BAR_WIDTH
        ));
    }
    out
}

/// Chart heading for a granularity
pub fn title_for(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Day => "Daily",
        Granularity::Week => "Weekly (weeks start Monday)",
        Granularity::Month => "Monthly",
    }
}

/// Metrics block plus all three charts
pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    if let Some(warning) = &dashboard.warning {
        out.push_str(&format!("WARNING: {}\n\n", warning));
    }
    out.push_str(&format!("Pure alcohol:   {}\n", dashboard.grams_display));
    out.push_str(&format!("Metabolism:     {}\n", dashboard.hours_display));
    out.push_str(&format!("Clear around:   {}\n", dashboard.clear_time));
    out.push_str(&format!("Logged entries: {}\n", dashboard.entry_count));
    if dashboard.skipped_rows > 0 {
        out.push_str(&format!(
            "Skipped rows:   {} (unreadable, see log)\n",
            dashboard.skipped_rows
        ));
    }
    for granularity in Granularity::ALL {
        out.push('\n');
        out.push_str(&render_bars(
            title_for(granularity),
            dashboard.charts.series(granularity),
        ));
    }
    out
}
