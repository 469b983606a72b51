//! SQL builders for the SQLite store, one module per table
pub mod ddl;
pub mod entries;
pub mod metadata;
