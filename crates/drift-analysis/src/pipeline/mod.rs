//! The scan pipeline: scanner → parser → detection → resolution → call
//! graph → boundaries → aggregation → confidence → outliers → learning →
//! graph intelligence → gold refresh.
//!
//! Incremental scans re-derive only facts owned by changed files; a scan
//! with no changes writes nothing to base tables. Cancellation is polled
//! between stages and at file boundaries inside them; a cancelled scan
//! commits what it has and reports `Cancelled`.

mod stages;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use drift_core::config::DriftConfig;
use drift_core::errors::{PipelineError, ScanStatus, StorageError};
use drift_core::events::{EventDispatcher, ScanComplete, ScanStarted};
use drift_core::CancellationToken;
use drift_storage::materialized::{self, RefreshDomains};
use drift_storage::queries::scan_history;
use drift_storage::{AdvisoryLock, BatchWriter, Store};

use crate::resolution::ResolutionDiagnostics;
use crate::scanner::Scanner;

pub use stages::FileAnalysis;

/// Summary handed back to the embedding surface.
#[derive(Debug)]
pub struct ScanOutcome {
    pub status: ScanStatus,
    pub scan_id: i64,
    pub files_added: usize,
    pub files_modified: usize,
    pub files_deleted: usize,
    pub files_unchanged: usize,
    pub pattern_count: usize,
    pub violation_count: usize,
    pub taint_flow_count: usize,
    pub convention_count: usize,
    pub resolution: ResolutionDiagnostics,
    pub duration_ms: u64,
}

pub struct ScanPipeline {
    store: Arc<Store>,
    config: DriftConfig,
    events: Arc<EventDispatcher>,
    cancel: CancellationToken,
}

impl ScanPipeline {
    pub fn new(
        store: Arc<Store>,
        config: DriftConfig,
        events: Arc<EventDispatcher>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store,
            config,
            events,
            cancel,
        }
    }

    /// Run one scan over `root`.
    pub fn run(&self, root: &Path) -> Result<ScanOutcome, PipelineError> {
        let started = Instant::now();
        let now = chrono::Utc::now().timestamp();

        // Write-heavy scans take the advisory lock; in-memory mode has no
        // cross-process surface to protect.
        let lock = if self.store.is_in_memory() {
            None
        } else {
            Some(AdvisoryLock::acquire(root, now).map_err(PipelineError::Storage)?)
        };

        self.events.scan_started(&ScanStarted {
            root: root.to_path_buf(),
        });

        let scan_id = self
            .store
            .with_writer(|conn| scan_history::begin_scan(conn, now))?;

        let (sender, writer) = BatchWriter::spawn(
            self.store.clone(),
            self.config.storage.ingest_channel_capacity,
            self.config.storage.max_batch_rows,
        );

        // Stage 1: walk + diff.
        let previous = self
            .store
            .with_reader(drift_storage::queries::files::load_all)?;
        let scanner = Scanner::new(self.config.scan.clone(), self.cancel.clone());
        let diff = scanner.scan(root, &previous);

        // Stage 2: persist the diff. Unchanged files contribute no writes.
        stages::persist_diff(&sender, &diff)?;

        let mut outcome = if diff.has_changes() && !diff.cancelled {
            // Stages 3..n: everything derived.
            stages::run_derivation(
                &self.store,
                &self.config,
                &self.events,
                &self.cancel,
                &sender,
                root,
                &diff,
                scan_id,
            )?
        } else {
            tracing::info!(scan_id, "no file changes; derivation skipped");
            stages::DerivationOutcome::default()
        };

        // Writer drain is deterministic: nothing below reads derived rows
        // until every queued command has committed.
        drop(sender);
        writer.close()?;

        // Pattern, confidence, and convention rows reference file rows the
        // channel just committed, so they persist only after the drain.
        if !outcome.patterns.is_empty() && !self.cancel.is_cancelled() {
            outcome.convention_count = stages::persist_intelligence(
                &self.store,
                &self.config,
                &self.events,
                &outcome.patterns,
                outcome.total_files,
                scan_id,
                outcome.relearn,
            )?;
        }

        let status = if self.cancel.is_cancelled() || diff.cancelled {
            ScanStatus::Cancelled
        } else {
            ScanStatus::Completed
        };

        let finished = chrono::Utc::now().timestamp();
        self.store.with_writer(|conn| {
            scan_history::finish_scan(
                conn,
                scan_id,
                finished,
                if status.is_cancelled() {
                    "cancelled"
                } else {
                    "completed"
                },
                diff.added.len() as u64,
                diff.modified.len() as u64,
                diff.deleted.len() as u64,
                diff.unchanged.len() as u64,
                outcome.pattern_count as u64,
            )
        })?;

        // Gold refresh is the last transaction of the scan; after it
        // commits, readers see one consistent snapshot.
        let domains = if diff.has_changes() {
            RefreshDomains::all()
        } else {
            RefreshDomains::default()
        };
        materialized::refresh_gold(&self.store, scan_id, domains)?;

        self.enforce_retention(finished)?;

        // Retention just checkpointed the WAL, so the main file is
        // complete and safe to copy.
        if let Some(path) = self.store.path() {
            let path = path.to_path_buf();
            drift_storage::backup::create_backup(&path, self.config.backup.keep)
                .map_err(PipelineError::Storage)?;
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        self.events.scan_complete(&ScanComplete {
            added: diff.added.len(),
            modified: diff.modified.len(),
            deleted: diff.deleted.len(),
            unchanged: diff.unchanged.len(),
            cancelled: status.is_cancelled(),
            duration_ms,
        });

        if let Some(lock) = lock {
            lock.release().map_err(PipelineError::Storage)?;
        }

        Ok(ScanOutcome {
            status,
            scan_id,
            files_added: diff.added.len(),
            files_modified: diff.modified.len(),
            files_deleted: diff.deleted.len(),
            files_unchanged: diff.unchanged.len(),
            pattern_count: outcome.pattern_count,
            violation_count: outcome.violation_count,
            taint_flow_count: outcome.taint_flow_count,
            convention_count: outcome.convention_count,
            resolution: outcome.resolution,
            duration_ms,
        })
    }

    fn enforce_retention(&self, now: i64) -> Result<(), StorageError> {
        let report = drift_storage::retention::enforce(
            &self.store,
            now,
            self.config.storage.retention_days,
            self.config.storage.retention_max_rows,
        )?;
        if report.rows_trimmed > 0 || report.vacuumed {
            tracing::debug!(
                trimmed = report.rows_trimmed,
                vacuumed = report.vacuumed,
                "retention enforced"
            );
        }
        Ok(())
    }
}
