//! Scanner and filesystem errors. Per-file failures never abort the scan.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("failed to read {path}: {message}")]
    ReadFailed { path: PathBuf, message: String },

    #[error("file exceeds size cap ({size} > {cap} bytes): {path}")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        cap: u64,
    },

    #[error("walk error: {message}")]
    WalkFailed { message: String },
}

impl ScanError {
    pub fn from_io(path: PathBuf, err: &std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied { path }
        } else {
            Self::ReadFailed {
                path,
                message: err.to_string(),
            }
        }
    }
}
