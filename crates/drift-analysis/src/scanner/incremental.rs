//! Two-level incremental classification: mtime short-circuit, then content
//! hash. Unchanged hash means zero downstream work for the file.

use std::path::PathBuf;

use drift_core::types::collections::{FxHashMap, FxHashSet};
use drift_storage::queries::files::FileRow;

use super::types::{FileEntry, FileState, ScanDiff, ScanStats};

/// Classify a freshly hashed entry against the persisted row.
pub fn classify(entry: &FileEntry, previous: Option<&FileRow>) -> FileState {
    match previous {
        None => FileState::Added,
        Some(row) if row.content_hash == entry.content_hash => FileState::Unchanged,
        Some(_) => FileState::Modified,
    }
}

/// Whether the mtime pair matches the persisted row, allowing the hash to
/// be reused without reading the file.
pub fn mtime_unchanged(row: &FileRow, mtime_secs: i64, mtime_nanos: u32) -> bool {
    row.mtime_secs == mtime_secs && row.mtime_nanos == mtime_nanos
}

/// Assemble the final diff: classified entries plus deletions (rows whose
/// path no longer exists on disk).
pub fn compute_diff(
    classified: Vec<(FileState, FileEntry)>,
    previous: &FxHashMap<String, FileRow>,
    stats: ScanStats,
    cancelled: bool,
) -> ScanDiff {
    let mut diff = ScanDiff {
        stats,
        cancelled,
        ..Default::default()
    };

    let mut seen: FxHashSet<String> = FxHashSet::default();
    for (state, entry) in classified {
        seen.insert(entry.path.to_string_lossy().replace('\\', "/"));
        match state {
            FileState::Added => diff.added.push(entry.path.clone()),
            FileState::Modified => diff.modified.push(entry.path.clone()),
            FileState::Unchanged => diff.unchanged.push(entry.path.clone()),
        }
        diff.entries.insert(entry.path.clone(), entry);
    }

    // A cancelled walk has not proven absence; deletions are only derivable
    // from a complete traversal.
    if !cancelled {
        for path in previous.keys() {
            if !seen.contains(path) {
                diff.deleted.push(PathBuf::from(path));
            }
        }
    }

    diff.added.sort();
    diff.modified.sort();
    diff.unchanged.sort();
    diff.deleted.sort();
    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, hash: u64) -> FileEntry {
        FileEntry {
            path: PathBuf::from(path),
            content_hash: hash,
            size: 10,
            language: None,
            mtime_secs: 0,
            mtime_nanos: 0,
            scan_error: None,
        }
    }

    fn row(path: &str, hash: u64) -> FileRow {
        FileRow {
            path: path.to_string(),
            content_hash: hash,
            size: 10,
            language: None,
            mtime_secs: 0,
            mtime_nanos: 0,
            scan_error: None,
        }
    }

    #[test]
    fn unseen_file_is_added() {
        assert_eq!(classify(&entry("a.ts", 1), None), FileState::Added);
    }

    #[test]
    fn same_hash_is_unchanged() {
        let prev = row("a.ts", 1);
        assert_eq!(classify(&entry("a.ts", 1), Some(&prev)), FileState::Unchanged);
    }

    #[test]
    fn different_hash_is_modified() {
        let prev = row("a.ts", 1);
        assert_eq!(classify(&entry("a.ts", 2), Some(&prev)), FileState::Modified);
    }

    #[test]
    fn missing_files_become_deletions() {
        let mut previous = FxHashMap::default();
        previous.insert("gone.ts".to_string(), row("gone.ts", 9));
        let diff = compute_diff(
            vec![(FileState::Unchanged, entry("kept.ts", 1))],
            &previous,
            ScanStats::default(),
            false,
        );
        assert_eq!(diff.deleted, vec![PathBuf::from("gone.ts")]);
    }

    #[test]
    fn cancelled_walk_derives_no_deletions() {
        let mut previous = FxHashMap::default();
        previous.insert("gone.ts".to_string(), row("gone.ts", 9));
        let diff = compute_diff(vec![], &previous, ScanStats::default(), true);
        assert!(diff.deleted.is_empty());
        assert!(diff.cancelled);
    }
}
