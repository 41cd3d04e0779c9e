//! Scanner output types.

use std::path::PathBuf;

use drift_core::types::collections::FxHashMap;
use serde::{Deserialize, Serialize};

use super::language::Language;

/// Classification of one file against the previous scan's metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Added,
    Modified,
    Unchanged,
}

/// One scanned file's metadata, ready for persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: PathBuf,
    pub content_hash: u64,
    pub size: u64,
    pub language: Option<Language>,
    pub mtime_secs: i64,
    pub mtime_nanos: u32,
    pub scan_error: Option<String>,
}

/// The diff a scan produces: which files changed relative to the store.
#[derive(Debug, Default)]
pub struct ScanDiff {
    pub added: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    /// Every live file's entry, keyed by path.
    pub entries: FxHashMap<PathBuf, FileEntry>,
    pub stats: ScanStats,
    /// Set when cancellation fired mid-walk; the diff covers a prefix.
    pub cancelled: bool,
}

impl ScanDiff {
    /// Files whose derived facts must be recomputed.
    pub fn dirty_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.added.iter().chain(self.modified.iter())
    }

    pub fn has_changes(&self) -> bool {
        !(self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    pub files_seen: usize,
    pub files_skipped_size: usize,
    pub files_errored: usize,
    pub bytes_hashed: u64,
    pub duration_ms: u64,
}
