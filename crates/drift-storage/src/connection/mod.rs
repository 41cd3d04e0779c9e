//! The `Store`: one mutex-guarded writer, a round-robin read pool.
//!
//! In-memory mode routes reads through the writer connection - separate
//! in-memory connections would be independent databases.

mod pool;
mod pragmas;
mod writer;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use drift_core::errors::StorageError;
use rusqlite::Connection;

use crate::migrations;

use self::pool::ReadPool;
pub use self::pragmas::{apply_read_pragmas, apply_write_pragmas};
pub use self::writer::immediate_transaction;

#[derive(Debug)]
pub struct Store {
    writer: Mutex<Connection>,
    readers: Option<ReadPool>,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (or create) the database at `path`, apply pragmas, run
    /// migrations, and stand up the read pool.
    pub fn open(path: &Path, read_pool_size: usize) -> Result<Self, StorageError> {
        let writer = Connection::open(path).map_err(sqlite_err)?;
        apply_write_pragmas(&writer)?;
        migrations::migrate(&writer)?;

        let readers = ReadPool::open(path, read_pool_size)?;
        Ok(Self {
            writer: Mutex::new(writer),
            readers: Some(readers),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database. Reads are served by the writer
    /// connection since in-memory databases cannot be shared across
    /// connections.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let writer = Connection::open_in_memory().map_err(sqlite_err)?;
        apply_write_pragmas(&writer)?;
        migrations::migrate(&writer)?;
        Ok(Self {
            writer: Mutex::new(writer),
            readers: None,
            path: None,
        })
    }

    /// Run a write closure on the serialized writer connection.
    pub fn with_writer<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let guard = self.writer.lock().map_err(|_| StorageError::Sqlite {
            message: "writer mutex poisoned".to_string(),
        })?;
        f(&guard)
    }

    /// Run a write closure inside a `BEGIN IMMEDIATE` transaction.
    pub fn with_write_tx<T>(
        &self,
        f: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        self.with_writer(|conn| immediate_transaction(conn, f))
    }

    /// Run a read closure on a pooled reader, or on the writer in
    /// in-memory mode.
    pub fn with_reader<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        match &self.readers {
            Some(pool) => pool.with_conn(f),
            None => self.with_writer(f),
        }
    }

    /// WAL checkpoint in TRUNCATE mode; run after retention trims.
    pub fn checkpoint_truncate(&self) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(sqlite_err)
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }
}

pub(crate) fn sqlite_err(err: rusqlite::Error) -> StorageError {
    StorageError::Sqlite {
        message: err.to_string(),
    }
}
