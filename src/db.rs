//! SQLite backing for the drink log.
//!
//! All SQL comes from the builders in `queries`; this module owns the pool,
//! the schema and the full-table read / rewrite used by the store.

use log::{debug, info};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Executor, Row};
use std::future::Future;
use std::path::Path;
use tokio::runtime::Runtime;

use crate::constants::EXPECTED_DB_VERSION;
use crate::entry::StoredRow;
use crate::error::DynError;
use crate::queries::{ddl, entries, metadata};

/// Synchronous SQLite database wrapper that owns a runtime for blocking operations.
/// Callers stay single-threaded and never see a future.
pub struct SyncDb {
    pool: SqlitePool,
    runtime: Runtime,
}

impl SyncDb {
    /// Open (creating if needed) the database at `db_path`, initialise the
    /// schema and check its version
    pub fn connect(db_path: &Path) -> Result<Self, DynError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let pool = runtime.block_on(async {
            let pool = open_database_connection(db_path).await?;
            init_database_schema(&pool).await?;
            ensure_version(&pool).await?;
            Ok::<SqlitePool, DynError>(pool)
        })?;
        Ok(Self { pool, runtime })
    }

    /// Block on an async future using the embedded runtime
    pub fn block_on<F, T>(&self, fut: F) -> Result<T, DynError>
    where
        F: Future<Output = Result<T, DynError>>,
    {
        self.runtime.block_on(fut)
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool; pending connections are released before returning
    pub fn close(self) {
        let Self { pool, runtime } = self;
        runtime.block_on(pool.close());
    }
}

/// Open a file-based connection pool, creating the file if missing
/// Enables WAL mode; a single connection keeps writes strictly ordered
pub async fn open_database_connection(db_path: &Path) -> Result<SqlitePool, DynError> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| format!("Failed to open database '{}': {}", db_path.display(), e))?;

    debug!("SQLite database: {}", db_path.display());
    Ok(pool)
}

/// Create tables and indexes if they do not exist yet
pub async fn init_database_schema(pool: &SqlitePool) -> Result<(), DynError> {
    sqlx::query(&ddl::create_metadata_table())
        .execute(pool)
        .await?;
    sqlx::query(&ddl::create_drink_log_table())
        .execute(pool)
        .await?;
    sqlx::query(&ddl::create_drink_log_date_index())
        .execute(pool)
        .await?;
    Ok(())
}

/// Stamp a fresh database with the current version, refuse any other version
pub async fn ensure_version(pool: &SqlitePool) -> Result<(), DynError> {
    match query_metadata(pool, metadata::VERSION_KEY).await? {
        Some(version) if version == EXPECTED_DB_VERSION => Ok(()),
        Some(version) => Err(format!(
            "Unsupported database version: '{}'. This application only supports version '{}'",
            version, EXPECTED_DB_VERSION
        )
        .into()),
        None => {
            info!("Initialising new drink log database (version {})", EXPECTED_DB_VERSION);
            upsert_metadata(pool, metadata::VERSION_KEY, EXPECTED_DB_VERSION).await
        }
    }
}

/// Update or insert a metadata key-value pair
pub async fn upsert_metadata<'e, E>(executor: E, key: &str, value: &str) -> Result<(), DynError>
where
    E: Executor<'e, Database = sqlx::Sqlite>,
{
    let sql = metadata::set_value(key, value);
    sqlx::query(&sql).execute(executor).await?;
    Ok(())
}

/// Query a single metadata value by key
pub async fn query_metadata<'e, E>(executor: E, key: &str) -> Result<Option<String>, DynError>
where
    E: Executor<'e, Database = sqlx::Sqlite>,
{
    let sql = metadata::select_value(key);
    let result = sqlx::query(&sql).fetch_optional(executor).await?;

    Ok(result.map(|row| row.get::<String, _>(0)))
}

/// Render one cell as text whatever its storage class
///
/// A column declared INTEGER or REAL may still hold text after a hand edit,
/// so each storage class is tried in turn. NULL becomes an empty cell.
fn cell_text(row: &SqliteRow, index: usize) -> Result<String, sqlx::Error> {
    if let Ok(text) = row.try_get::<Option<String>, _>(index) {
        return Ok(text.unwrap_or_default());
    }
    if let Ok(n) = row.try_get::<i64, _>(index) {
        return Ok(n.to_string());
    }
    if let Ok(x) = row.try_get::<f64, _>(index) {
        return Ok(x.to_string());
    }
    let bytes = row.try_get::<Vec<u8>, _>(index)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read every row of the drink log in insertion order
///
/// Every row comes back, parseable or not; deciding what to chart is left to
/// `entry::parse_rows` so a later rewrite carries hand-edited rows through.
pub async fn fetch_all_rows(pool: &SqlitePool) -> Result<Vec<StoredRow>, DynError> {
    let sql = entries::select_all();
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        out.push(StoredRow {
            date: cell_text(row, 0)?,
            drink_type: cell_text(row, 1)?,
            amount: cell_text(row, 2)?,
            alcohol_g: cell_text(row, 3)?,
        });
    }
    Ok(out)
}

/// Replace the whole drink log with `rows` in one transaction
pub async fn replace_all_rows(pool: &SqlitePool, rows: &[StoredRow]) -> Result<(), DynError> {
    let mut tx = pool.begin().await?;

    sqlx::query(&entries::delete_all()).execute(&mut *tx).await?;
    for row in rows {
        let sql = entries::insert(row);
        sqlx::query(&sql).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    debug!("Rewrote drink log with {} rows", rows.len());
    Ok(())
}

/// Create a database in a temporary directory for testing
/// Returns the pool and the directory guard; the file lives at `<dir>/test.sqlite`
pub async fn create_test_connection_in_temporary_file(
) -> Result<(SqlitePool, tempfile::TempDir), DynError> {
    let temp_dir = tempfile::tempdir()?;
    let db_path = temp_dir.path().join("test.sqlite");
    let pool = open_database_connection(&db_path).await?;
    Ok((pool, temp_dir))
}
