use sea_query::{Order, Query, SimpleExpr, SqliteQueryBuilder};

use crate::entry::StoredRow;
use crate::schema::DrinkLog;

/// SELECT date, drink_type, amount, alcohol_g FROM drink_log ORDER BY id
pub fn select_all() -> String {
    Query::select()
        .columns([
            DrinkLog::Date,
            DrinkLog::DrinkType,
            DrinkLog::Amount,
            DrinkLog::AlcoholG,
        ])
        .from(DrinkLog::Table)
        .order_by(DrinkLog::Id, Order::Asc)
        .to_string(SqliteQueryBuilder)
}

/// DELETE FROM drink_log
pub fn delete_all() -> String {
    Query::delete()
        .from_table(DrinkLog::Table)
        .to_string(SqliteQueryBuilder)
}

/// Integer when the cell holds one, otherwise the text as written
fn integer_cell(text: &str) -> SimpleExpr {
    match text.trim().parse::<i64>() {
        Ok(n) => n.into(),
        Err(_) => text.into(),
    }
}

/// Finite real when the cell holds one, otherwise the text as written
fn real_cell(text: &str) -> SimpleExpr {
    match text.trim().parse::<f64>() {
        Ok(x) if x.is_finite() => x.into(),
        _ => text.into(),
    }
}

/// INSERT INTO drink_log (date, drink_type, amount, alcohol_g) VALUES (?, ?, ?, ?)
///
/// Numeric cells are written as numbers; cells that do not parse are kept
/// verbatim so a rewrite never loses a hand-edited value.
pub fn insert(row: &StoredRow) -> String {
    Query::insert()
        .into_table(DrinkLog::Table)
        .columns([
            DrinkLog::Date,
            DrinkLog::DrinkType,
            DrinkLog::Amount,
            DrinkLog::AlcoholG,
        ])
        .values_panic([
            row.date.as_str().into(),
            row.drink_type.as_str().into(),
            integer_cell(&row.amount),
            real_cell(&row.alcohol_g),
        ])
        .to_string(SqliteQueryBuilder)
}
