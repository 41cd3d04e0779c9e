//! Round-robin pool of read-only connections.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use drift_core::errors::StorageError;
use rusqlite::{Connection, OpenFlags};

use super::{pragmas::apply_read_pragmas, sqlite_err};

const MAX_POOL_SIZE: usize = 8;

#[derive(Debug)]
pub struct ReadPool {
    conns: Vec<Mutex<Connection>>,
    cursor: AtomicUsize,
}

impl ReadPool {
    pub fn open(path: &Path, size: usize) -> Result<Self, StorageError> {
        let size = size.clamp(1, MAX_POOL_SIZE);
        let mut conns = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(sqlite_err)?;
            apply_read_pragmas(&conn)?;
            conns.push(Mutex::new(conn));
        }
        Ok(Self {
            conns,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.conns.len();
        let guard = self.conns[idx].lock().map_err(|_| StorageError::Sqlite {
            message: "read pool mutex poisoned".to_string(),
        })?;
        f(&guard)
    }

    pub fn size(&self) -> usize {
        self.conns.len()
    }
}
