// Library interface for the CLI and the tests

pub mod aggregator;
pub mod chart;
pub mod config;
pub mod constants;
pub mod db;
pub mod drinks;
pub mod entry;
pub mod error;
pub mod estimator;
pub mod form;
pub mod queries;
pub mod schema;
pub mod serve;
pub mod store;

pub use aggregator::{aggregate, BucketSummary, Granularity};
pub use constants::EXPECTED_DB_VERSION;
pub use drinks::DrinkType;
pub use entry::{LogEntry, StoredRow};
pub use error::{DynError, LogError};
pub use estimator::{compute_metrics, project_clear_time, Metrics};
pub use store::{LogStore, MemoryStore, SqliteStore};
