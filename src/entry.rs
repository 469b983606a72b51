use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::drinks::DrinkType;
use crate::error::LogError;
use crate::estimator::pure_alcohol_grams;

/// Date format of the `date` column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One recorded drinking event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: NaiveDate,
    /// Stored label, kept verbatim so rows from other tools survive
    pub drink_type: String,
    pub amount_ml: u32,
    /// Computed once when the entry is created
    pub alcohol_grams: f64,
}

impl LogEntry {
    /// Create an entry for `drink`, computing its grams of pure alcohol
    pub fn new(date: NaiveDate, drink: DrinkType, amount_ml: u32) -> Self {
        Self {
            date,
            drink_type: drink.label().to_string(),
            amount_ml,
            alcohol_grams: pure_alcohol_grams(drink.strength_pct(), amount_ml as f64),
        }
    }

    /// Row as written to the store
    pub fn to_row(&self) -> StoredRow {
        StoredRow {
            date: self.date.format(DATE_FORMAT).to_string(),
            drink_type: self.drink_type.clone(),
            amount: self.amount_ml.to_string(),
            alcohol_g: self.alcohol_grams.to_string(),
        }
    }
}

/// Raw row of the tabular store: `date`, `drink_type`, `amount`, `alcohol_g`
///
/// Cells are kept as text so a hand-edited row is carried through a rewrite
/// untouched even when it cannot be parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRow {
    pub date: String,
    pub drink_type: String,
    pub amount: String,
    pub alcohol_g: String,
}

impl StoredRow {
    /// Parse into an entry; `index` is only used in the error message
    pub fn to_entry(&self, index: usize) -> Result<LogEntry, LogError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).map_err(|e| {
            LogError::MalformedRow {
                index,
                reason: format!("unparseable date '{}': {}", self.date, e),
            }
        })?;
        let amount_ml = self
            .amount
            .trim()
            .parse::<u32>()
            .map_err(|_| LogError::MalformedRow {
                index,
                reason: format!("amount '{}' is not a whole number of ml", self.amount),
            })?;
        let alcohol_grams = self
            .alcohol_g
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|g| g.is_finite() && *g >= 0.0)
            .ok_or_else(|| LogError::MalformedRow {
                index,
                reason: format!("alcohol_g '{}' is not a non-negative number", self.alcohol_g),
            })?;
        Ok(LogEntry {
            date,
            drink_type: self.drink_type.clone(),
            amount_ml,
            alcohol_grams,
        })
    }
}

/// Entries parsed from a table snapshot, plus how many rows were dropped
#[derive(Debug, Clone, Default)]
pub struct ParsedLog {
    pub entries: Vec<LogEntry>,
    pub skipped: usize,
}

/// Parse every row, skipping (and logging) the ones that are malformed
pub fn parse_rows(rows: &[StoredRow]) -> ParsedLog {
    let mut parsed = ParsedLog::default();
    for (index, row) in rows.iter().enumerate() {
        match row.to_entry(index) {
            Ok(entry) => parsed.entries.push(entry),
            Err(e) => {
                warn!("Skipping stored row: {}", e);
                parsed.skipped += 1;
            }
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, amount: &str, grams: &str) -> StoredRow {
        StoredRow {
            date: date.to_string(),
            drink_type: "Beer (5%)".to_string(),
            amount: amount.to_string(),
            alcohol_g: grams.to_string(),
        }
    }

    #[test]
    fn test_new_entry_computes_grams() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        let entry = LogEntry::new(date, DrinkType::Wine, 180);
        assert!((entry.alcohol_grams - 17.28).abs() < 1e-9);
        assert_eq!(entry.drink_type, "Wine (12%)");
    }

    #[test]
    fn test_row_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        let row = LogEntry::new(date, DrinkType::Beer, 350).to_row();
        assert_eq!(row.date, "2024-01-09");
        assert_eq!(row.amount, "350");
    }

    #[test]
    fn test_parse_rows_skips_malformed() {
        let rows = vec![
            row("2024-01-01", "350", "14"),
            row("yesterday", "350", "14"),
            row("2024-01-02", "-5", "1"),
            row("2024-01-03", "100", "NaN"),
            row(" 2024-01-04 ", " 100", "4.0"),
            row("2024-01-05", "lots", "14"),
            row("2024-01-06", "350", ""),
        ];
        let parsed = parse_rows(&rows);
        assert_eq!(parsed.skipped, 5);
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(
            parsed.entries[1].date,
            NaiveDate::from_ymd_opt(2024, 1, 4).unwrap()
        );
    }

    #[test]
    fn test_stored_grams_are_not_recomputed() {
        let entry = row("2024-02-02", "350", "99.5").to_entry(0).unwrap();
        assert_eq!(entry.alcohol_grams, 99.5);
    }

    #[test]
    fn test_row_text_parses_back_to_same_grams() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 7).unwrap();
        let entry = LogEntry::new(date, DrinkType::Wine, 180);
        let back = entry.to_row().to_entry(0).unwrap();
        assert_eq!(back.alcohol_grams, entry.alcohol_grams);
        assert_eq!(back.amount_ml, 180);
    }
}
