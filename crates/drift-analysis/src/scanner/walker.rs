//! The parallel directory walker.
//!
//! Built on `ignore`'s work-stealing walker: .gitignore semantics plus the
//! project's own ignore file with identical grammar. Cancellation is polled
//! per file; on cancel the walk quits and the partial diff is tagged.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use drift_core::config::ScanConfig;
use drift_core::types::collections::FxHashMap;
use drift_core::CancellationToken;
use drift_storage::queries::files::FileRow;
use ignore::{WalkBuilder, WalkState};

use super::hasher::hash_bytes;
use super::incremental::{classify, compute_diff, mtime_unchanged};
use super::language::Language;
use super::types::{FileEntry, FileState, ScanDiff, ScanStats};

pub struct Scanner {
    config: ScanConfig,
    cancel: CancellationToken,
}

impl Scanner {
    pub fn new(config: ScanConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }

    /// Walk `root` and diff against the previous scan's file rows.
    pub fn scan(&self, root: &Path, previous: &FxHashMap<String, FileRow>) -> ScanDiff {
        let started = Instant::now();
        let collected: Mutex<Vec<(FileState, FileEntry)>> = Mutex::new(Vec::new());
        let stats: Mutex<ScanStats> = Mutex::new(ScanStats::default());

        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_exclude(true)
            .add_custom_ignore_filename(&self.config.ignore_file);
        if self.config.threads > 0 {
            builder.threads(self.config.threads);
        }

        let walker = builder.build_parallel();
        walker.run(|| {
            let collected = &collected;
            let stats = &stats;
            let cancel = &self.cancel;
            let root = root.to_path_buf();
            let max_size = self.config.max_file_size_bytes;
            let force_full = self.config.force_full;

            Box::new(move |result| {
                if cancel.is_cancelled() {
                    return WalkState::Quit;
                }
                let entry = match result {
                    Ok(entry) => entry,
                    Err(err) => {
                        tracing::debug!(error = %err, "walk entry error");
                        stats.lock().unwrap().files_errored += 1;
                        return WalkState::Continue;
                    }
                };
                if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                    return WalkState::Continue;
                }

                match process_file(entry.path(), &root, previous, max_size, force_full) {
                    Some((state, file_entry)) => {
                        {
                            let mut s = stats.lock().unwrap();
                            s.files_seen += 1;
                            s.bytes_hashed += file_entry.size;
                            if file_entry.scan_error.is_some() {
                                s.files_errored += 1;
                            }
                        }
                        collected.lock().unwrap().push((state, file_entry));
                    }
                    None => {
                        stats.lock().unwrap().files_skipped_size += 1;
                    }
                }
                WalkState::Continue
            })
        });

        let mut stats = stats.into_inner().unwrap();
        stats.duration_ms = started.elapsed().as_millis() as u64;
        let classified = collected.into_inner().unwrap();
        compute_diff(classified, previous, stats, self.cancel.is_cancelled())
    }
}

/// Hash and classify one file. Returns `None` for files over the size cap
/// (they are invisible to the pipeline, not errors).
fn process_file(
    path: &Path,
    root: &Path,
    previous: &FxHashMap<String, FileRow>,
    max_size: u64,
    force_full: bool,
) -> Option<(FileState, FileEntry)> {
    let metadata = std::fs::metadata(path).ok()?;
    if metadata.len() > max_size {
        return None;
    }

    let rel = relative_key(path, root);
    let (mtime_secs, mtime_nanos) = mtime_parts(&metadata);
    let previous_row = previous.get(&rel);

    // Level 1: identical mtime lets us trust the stored hash without a read.
    if !force_full {
        if let Some(row) = previous_row {
            if mtime_unchanged(row, mtime_secs, mtime_nanos) {
                let entry = FileEntry {
                    path: PathBuf::from(rel),
                    content_hash: row.content_hash,
                    size: metadata.len(),
                    language: row.language.as_deref().and_then(Language::parse_name),
                    mtime_secs,
                    mtime_nanos,
                    scan_error: None,
                };
                return Some((FileState::Unchanged, entry));
            }
        }
    }

    // Level 2: read + hash. Files in no supported language are invisible
    // to the engine; a read failure on a recognized extension is recorded
    // as a per-file error instead.
    let ext = path.extension().and_then(|e| e.to_str());
    let (content_hash, language, scan_error) = match std::fs::read(path) {
        Ok(bytes) => {
            let hash = hash_bytes(&bytes);
            let text = String::from_utf8_lossy(&bytes);
            match Language::detect(ext, &text) {
                Some(language) => (hash, Some(language), None),
                None => return None,
            }
        }
        Err(err) => {
            ext.and_then(Language::from_extension)?;
            let scan_error = drift_core::errors::ScanError::from_io(path.to_path_buf(), &err);
            (0, None, Some(scan_error.to_string()))
        }
    };

    let entry = FileEntry {
        path: PathBuf::from(rel),
        content_hash,
        size: metadata.len(),
        language,
        mtime_secs,
        mtime_nanos,
        scan_error,
    };
    let state = classify(&entry, previous_row);
    Some((state, entry))
}

fn relative_key(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn mtime_parts(metadata: &std::fs::Metadata) -> (i64, u32) {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| (d.as_secs() as i64, d.subsec_nanos()))
        .unwrap_or((0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_dir(dir: &Path) -> ScanDiff {
        let scanner = Scanner::new(ScanConfig::default(), CancellationToken::new());
        scanner.scan(dir, &FxHashMap::default())
    }

    #[test]
    fn finds_source_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts"), "export const a = 1;\n").unwrap();
        std::fs::write(dir.path().join("b.py"), "def b():\n    pass\n").unwrap();

        let diff = scan_dir(dir.path());
        assert_eq!(diff.added.len(), 2);
        assert!(diff.entries.values().all(|e| e.language.is_some()));
    }

    #[test]
    fn honors_custom_ignore_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".driftignore"), "generated/\n").unwrap();
        std::fs::create_dir(dir.path().join("generated")).unwrap();
        std::fs::write(dir.path().join("generated/out.ts"), "x").unwrap();
        std::fs::write(dir.path().join("kept.ts"), "export {};\n").unwrap();

        let diff = scan_dir(dir.path());
        let names: Vec<String> = diff
            .added
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        assert!(names.contains(&"kept.ts".to_string()));
        assert!(!names.iter().any(|n| n.contains("generated")));
    }

    #[test]
    fn oversize_files_are_invisible() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScanConfig {
            max_file_size_bytes: 8,
            ..Default::default()
        };
        std::fs::write(dir.path().join("big.ts"), "x".repeat(64)).unwrap();
        let scanner = Scanner::new(config, CancellationToken::new());
        let diff = scanner.scan(dir.path(), &FxHashMap::default());
        assert!(diff.added.is_empty());
        assert_eq!(diff.stats.files_skipped_size, 1);
    }

    #[test]
    fn rescan_reports_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts"), "export const a = 1;\n").unwrap();

        let first = scan_dir(dir.path());
        let previous: FxHashMap<String, FileRow> = first
            .entries
            .values()
            .map(|e| {
                let key = e.path.to_string_lossy().into_owned();
                (
                    key.clone(),
                    FileRow {
                        path: key,
                        content_hash: e.content_hash,
                        size: e.size,
                        language: e.language.map(|l| l.name().to_string()),
                        mtime_secs: e.mtime_secs,
                        mtime_nanos: e.mtime_nanos,
                        scan_error: None,
                    },
                )
            })
            .collect();

        let second = {
            let scanner = Scanner::new(ScanConfig::default(), CancellationToken::new());
            scanner.scan(dir.path(), &previous)
        };
        assert!(second.added.is_empty());
        assert!(second.modified.is_empty());
        assert_eq!(second.unchanged.len(), 1);
    }

    #[test]
    fn pre_cancelled_scan_is_tagged() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts"), "x").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let scanner = Scanner::new(ScanConfig::default(), cancel);
        let diff = scanner.scan(dir.path(), &FxHashMap::default());
        assert!(diff.cancelled);
    }
}
