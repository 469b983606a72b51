//! The tabular store contract and its implementations.
//!
//! A store only knows how to hand back the whole table and how to take a
//! whole new table. Appending an entry means reading everything, pushing one
//! row and writing everything back, bracketed by an explicit lease.

use fs2::FileExt;
use log::{debug, info};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::db::{self, SyncDb};
use crate::entry::StoredRow;
use crate::error::{DynError, LogError};

/// Exclusive hold on a store for one read-modify-write cycle
///
/// Dropping the lease releases it.
#[derive(Debug)]
pub struct StoreLease {
    lock_file: Option<File>,
}

impl StoreLease {
    /// Lease for stores with nothing to lock
    pub fn unlocked() -> Self {
        Self { lock_file: None }
    }

    /// Release explicitly instead of waiting for drop
    pub fn release(mut self) {
        if let Some(file) = self.lock_file.take() {
            let _ = file.unlock();
        }
    }
}

impl Drop for StoreLease {
    fn drop(&mut self) {
        if let Some(file) = self.lock_file.take() {
            let _ = file.unlock();
        }
    }
}

/// Full-table store: `read_all` and `append_and_replace` are the only data operations
pub trait LogStore {
    /// Take the exclusive lease for one cycle
    fn acquire(&mut self) -> Result<StoreLease, LogError>;

    /// Every stored row, in insertion order
    fn read_all(&mut self) -> Result<Vec<StoredRow>, LogError>;

    /// Replace the stored table with `table` (the full table, not a delta)
    fn append_and_replace(&mut self, table: Vec<StoredRow>) -> Result<(), LogError>;
}

/// Store backed by a SQLite file
pub struct SqliteStore {
    db: SyncDb,
    db_path: PathBuf,
    lock_path: PathBuf,
}

impl SqliteStore {
    /// Open or create the database file at `db_path`
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, DynError> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    format!("Failed to create directory '{}': {}", parent.display(), e)
                })?;
            }
        }
        let db = SyncDb::connect(&db_path)?;
        let lock_path = lock_path_for(&db_path);
        info!("Opened drink log at {}", db_path.display());
        Ok(Self {
            db,
            db_path,
            lock_path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Close the underlying pool
    pub fn close(self) {
        self.db.close();
    }
}

/// Sidecar lock file: `<db>.lock`
fn lock_path_for(db_path: &Path) -> PathBuf {
    let mut name = db_path.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

impl LogStore for SqliteStore {
    fn acquire(&mut self) -> Result<StoreLease, LogError> {
        let file = File::create(&self.lock_path).map_err(|e| {
            LogError::Store(format!(
                "Failed to create lock file '{}': {}",
                self.lock_path.display(),
                e
            ))
        })?;
        file.lock_exclusive().map_err(|e| {
            LogError::Store(format!(
                "Failed to lock '{}': {}",
                self.lock_path.display(),
                e
            ))
        })?;
        debug!("Acquired lease on {}", self.lock_path.display());
        Ok(StoreLease {
            lock_file: Some(file),
        })
    }

    fn read_all(&mut self) -> Result<Vec<StoredRow>, LogError> {
        let pool = self.db.pool().clone();
        self.db
            .block_on(async move { db::fetch_all_rows(&pool).await })
            .map_err(|e| LogError::Store(format!("Failed to read drink log: {}", e)))
    }

    fn append_and_replace(&mut self, table: Vec<StoredRow>) -> Result<(), LogError> {
        let pool = self.db.pool().clone();
        self.db
            .block_on(async move { db::replace_all_rows(&pool, &table).await })
            .map_err(|e| LogError::Store(format!("Failed to write drink log: {}", e)))
    }
}

/// Store that lives only as long as the process
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    rows: Vec<StoredRow>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<StoredRow>) -> Self {
        Self { rows }
    }
}

impl LogStore for MemoryStore {
    fn acquire(&mut self) -> Result<StoreLease, LogError> {
        Ok(StoreLease::unlocked())
    }

    fn read_all(&mut self) -> Result<Vec<StoredRow>, LogError> {
        Ok(self.rows.clone())
    }

    fn append_and_replace(&mut self, table: Vec<StoredRow>) -> Result<(), LogError> {
        self.rows = table;
        Ok(())
    }
}
