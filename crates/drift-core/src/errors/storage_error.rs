//! Storage errors. Busy is retried with jitter inside the store before it
//! ever propagates out of `drift-storage`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {message}")]
    Sqlite { message: String },

    #[error("database is busy after retries: {message}")]
    Busy { message: String },

    #[error("disk full while writing {context}")]
    DiskFull { context: String },

    #[error("database corrupt: {message}")]
    Corrupt { message: String },

    #[error("migration to v{version} failed: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("database schema v{found} is newer than supported v{supported}")]
    SchemaTooNew { found: u32, supported: u32 },

    #[error("batch channel closed before drain completed")]
    ChannelClosed,

    #[error("advisory lock held by pid {pid} since {since}")]
    Locked { pid: u32, since: i64 },

    #[error("i/o error: {message}")]
    Io { message: String },
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}
