use sea_query::{ColumnDef, Index, SqliteQueryBuilder, Table};

use crate::schema::{DrinkLog, Metadata};

/// CREATE TABLE IF NOT EXISTS metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL)
pub fn create_metadata_table() -> String {
    Table::create()
        .table(Metadata::Table)
        .if_not_exists()
        .col(ColumnDef::new(Metadata::Key).string().primary_key())
        .col(ColumnDef::new(Metadata::Value).string().not_null())
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS drink_log (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     date TEXT NOT NULL,
///     drink_type TEXT NOT NULL,
///     amount INTEGER NOT NULL,
///     alcohol_g REAL NOT NULL
/// )
///
/// `date` is free text so rows typed in by hand survive a read.
pub fn create_drink_log_table() -> String {
    Table::create()
        .table(DrinkLog::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(DrinkLog::Id)
                .integer()
                .primary_key()
                .auto_increment(),
        )
        .col(ColumnDef::new(DrinkLog::Date).string().not_null())
        .col(ColumnDef::new(DrinkLog::DrinkType).string().not_null())
        .col(ColumnDef::new(DrinkLog::Amount).big_integer().not_null())
        .col(ColumnDef::new(DrinkLog::AlcoholG).double().not_null())
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_drink_log_date ON drink_log(date)
pub fn create_drink_log_date_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_drink_log_date")
        .table(DrinkLog::Table)
        .col(DrinkLog::Date)
        .to_string(SqliteQueryBuilder)
}
