use sea_query::{Expr, OnConflict, Query, SqliteQueryBuilder};

use crate::schema::Metadata;

/// Metadata key holding the schema version
pub const VERSION_KEY: &str = "version";

/// SELECT value FROM metadata WHERE key = ?
pub fn select_value(key: &str) -> String {
    Query::select()
        .column(Metadata::Value)
        .from(Metadata::Table)
        .and_where(Expr::col(Metadata::Key).eq(key))
        .to_string(SqliteQueryBuilder)
}

/// INSERT INTO metadata (key, value) VALUES (?, ?)
/// ON CONFLICT (key) DO UPDATE SET value = excluded.value
pub fn set_value(key: &str, value: &str) -> String {
    Query::insert()
        .into_table(Metadata::Table)
        .columns([Metadata::Key, Metadata::Value])
        .values_panic([key.into(), value.into()])
        .on_conflict(
            OnConflict::column(Metadata::Key)
                .update_column(Metadata::Value)
                .to_owned(),
        )
        .to_string(SqliteQueryBuilder)
}
