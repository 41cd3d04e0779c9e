//! The batch writer thread.

use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, Sender};
use drift_core::errors::StorageError;
use rusqlite::params;

use crate::connection::{sqlite_err, Store};

use super::commands::BatchCommand;

/// Producer handle. Cloneable; `send` blocks when the channel is full.
#[derive(Clone)]
pub struct BatchSender {
    tx: Sender<BatchCommand>,
}

impl BatchSender {
    pub fn send(&self, command: BatchCommand) -> Result<(), StorageError> {
        self.tx
            .send(command)
            .map_err(|_| StorageError::ChannelClosed)
    }
}

/// The writer half: owns the thread, joins on `close`.
pub struct BatchWriter {
    tx: Option<Sender<BatchCommand>>,
    handle: Option<JoinHandle<Result<u64, StorageError>>>,
}

impl BatchWriter {
    /// Spawn the writer thread. Commands are applied through the store's
    /// single writer connection, keeping the one-writer contract intact.
    pub fn spawn(store: Arc<Store>, capacity: usize, max_batch_rows: usize) -> (BatchSender, Self) {
        let (tx, rx) = bounded(capacity.max(1));
        let rows = max_batch_rows.max(1);
        let handle = std::thread::Builder::new()
            .name("drift-batch-writer".to_string())
            .spawn(move || drain_loop(store, rx, rows))
            .expect("failed to spawn batch writer thread");

        (
            BatchSender { tx: tx.clone() },
            Self {
                tx: Some(tx),
                handle: Some(handle),
            },
        )
    }

    /// Close the channel and block until every queued command committed.
    /// Returns the number of commands applied.
    pub fn close(mut self) -> Result<u64, StorageError> {
        drop(self.tx.take());
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| StorageError::Sqlite {
                message: "batch writer thread panicked".to_string(),
            })?,
            None => Ok(0),
        }
    }
}

fn drain_loop(
    store: Arc<Store>,
    rx: Receiver<BatchCommand>,
    max_rows: usize,
) -> Result<u64, StorageError> {
    let mut applied: u64 = 0;
    let mut pending: Vec<BatchCommand> = Vec::with_capacity(max_rows);

    loop {
        // Block for the first command of a batch; fill the rest greedily.
        match rx.recv() {
            Ok(first) => pending.push(first),
            Err(_) => break, // channel closed and empty
        }
        while pending.len() < max_rows {
            match rx.try_recv() {
                Ok(cmd) => pending.push(cmd),
                Err(_) => break,
            }
        }

        let batch = std::mem::take(&mut pending);
        let count = batch.len() as u64;
        store.with_write_tx(|tx| {
            for cmd in &batch {
                apply(tx, cmd)?;
            }
            Ok(())
        })?;
        applied += count;
    }

    tracing::debug!(applied, "batch writer drained");
    Ok(applied)
}

fn apply(tx: &rusqlite::Transaction<'_>, cmd: &BatchCommand) -> Result<(), StorageError> {
    match cmd {
        BatchCommand::UpsertFile {
            path,
            content_hash,
            size,
            language,
            mtime_secs,
            mtime_nanos,
            scan_error,
        } => {
            tx.execute(
                "INSERT INTO file_metadata
                    (path, content_hash, size, language, mtime_secs, mtime_nanos, scan_error, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, unixepoch())
                 ON CONFLICT(path) DO UPDATE SET
                    content_hash = excluded.content_hash,
                    size = excluded.size,
                    language = excluded.language,
                    mtime_secs = excluded.mtime_secs,
                    mtime_nanos = excluded.mtime_nanos,
                    scan_error = excluded.scan_error,
                    updated_at = unixepoch()",
                params![
                    path,
                    *content_hash as i64,
                    *size as i64,
                    language,
                    mtime_secs,
                    mtime_nanos,
                    scan_error
                ],
            )
            .map_err(sqlite_err)?;
        }
        BatchCommand::DeleteFile { path } => {
            // Cascades clear functions, edges, detections, locations,
            // boundaries, and flows owned by the file.
            tx.execute("DELETE FROM file_metadata WHERE path = ?1", params![path])
                .map_err(sqlite_err)?;
        }
        BatchCommand::PurgeFileDerived { path } => {
            tx.execute("DELETE FROM functions WHERE file = ?1", params![path])
                .map_err(sqlite_err)?;
            tx.execute("DELETE FROM detections WHERE file = ?1", params![path])
                .map_err(sqlite_err)?;
            tx.execute(
                "DELETE FROM pattern_locations WHERE file = ?1",
                params![path],
            )
            .map_err(sqlite_err)?;
            tx.execute("DELETE FROM boundaries WHERE file = ?1", params![path])
                .map_err(sqlite_err)?;
            tx.execute(
                "DELETE FROM sensitive_fields WHERE file = ?1",
                params![path],
            )
            .map_err(sqlite_err)?;
            tx.execute("DELETE FROM taint_flows WHERE file = ?1", params![path])
                .map_err(sqlite_err)?;
            tx.execute("DELETE FROM violations WHERE file = ?1", params![path])
                .map_err(sqlite_err)?;
        }
        BatchCommand::InsertFunction {
            file,
            name,
            qualified_name,
            signature,
            body_hash,
            start_line,
            end_line,
            is_entry_point,
            is_injectable,
            is_auth_handler,
            is_test,
            is_data_accessor,
        } => {
            tx.execute(
                "INSERT OR IGNORE INTO functions
                    (file, name, qualified_name, signature, body_hash, start_line, end_line,
                     is_entry_point, is_injectable, is_auth_handler, is_test, is_data_accessor)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    file,
                    name,
                    qualified_name,
                    signature,
                    *body_hash as i64,
                    start_line,
                    end_line,
                    is_entry_point,
                    is_injectable,
                    is_auth_handler,
                    is_test,
                    is_data_accessor
                ],
            )
            .map_err(sqlite_err)?;
        }
        BatchCommand::InsertCallEdge {
            caller_file,
            caller_qualified,
            callee_file,
            callee_qualified,
            resolution,
            confidence,
            call_line,
        } => {
            // Row ids are resolved here so producers only ever deal in
            // natural keys.
            tx.execute(
                "INSERT INTO call_edges (caller_id, callee_id, resolution, confidence, call_line)
                 SELECT caller.id,
                        (SELECT id FROM functions
                          WHERE file = ?3 AND qualified_name = ?4
                          LIMIT 1),
                        ?5, ?6, ?7
                 FROM functions caller
                 WHERE caller.file = ?1 AND caller.qualified_name = ?2
                 LIMIT 1",
                params![
                    caller_file,
                    caller_qualified,
                    callee_file,
                    callee_qualified,
                    resolution,
                    confidence,
                    call_line
                ],
            )
            .map_err(sqlite_err)?;
        }
        BatchCommand::InsertDetection {
            scan_id,
            file,
            line,
            column,
            pattern_id,
            detector_id,
            category,
            confidence,
            snippet,
        } => {
            tx.execute(
                "INSERT INTO detections
                    (scan_id, file, line, column_num, pattern_id, detector_id, category, confidence, snippet)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    scan_id, file, line, column, pattern_id, detector_id, category, confidence,
                    snippet
                ],
            )
            .map_err(sqlite_err)?;
        }
        BatchCommand::InsertBoundary {
            scan_id,
            file,
            line,
            framework,
            table_name,
            operation,
            fields_json,
            confidence,
        } => {
            tx.execute(
                "INSERT INTO boundaries
                    (scan_id, file, line, framework, table_name, operation, fields, confidence)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    scan_id, file, line, framework, table_name, operation, fields_json, confidence
                ],
            )
            .map_err(sqlite_err)?;
        }
        BatchCommand::InsertSensitiveField {
            file,
            line,
            field_name,
            table_name,
            sensitivity,
            confidence,
        } => {
            tx.execute(
                "INSERT INTO sensitive_fields
                    (file, line, field_name, table_name, sensitivity, confidence)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![file, line, field_name, table_name, sensitivity, confidence],
            )
            .map_err(sqlite_err)?;
        }
        BatchCommand::InsertViolation {
            scan_id,
            file,
            line,
            column,
            pattern_id,
            severity,
            message,
            fingerprint,
            is_new,
            cwe_id,
        } => {
            tx.execute(
                "INSERT INTO violations
                    (scan_id, file, line, column_num, pattern_id, severity, message, fingerprint, is_new, cwe_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    scan_id,
                    file,
                    line,
                    column,
                    pattern_id,
                    severity,
                    message,
                    fingerprint,
                    is_new,
                    cwe_id
                ],
            )
            .map_err(sqlite_err)?;
        }
        BatchCommand::InsertTaintFlow {
            scan_id,
            file,
            cwe_id,
            severity,
            steps_json,
        } => {
            tx.execute(
                "INSERT INTO taint_flows (scan_id, file, cwe_id, severity, steps)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![scan_id, file, cwe_id, severity, steps_json],
            )
            .map_err(sqlite_err)?;
        }
        BatchCommand::CacheParseResult {
            language,
            content_hash,
            result_json,
        } => {
            tx.execute(
                "INSERT OR REPLACE INTO parse_cache (language, content_hash, result, created_at)
                 VALUES (?1, ?2, ?3, unixepoch())",
                params![language, *content_hash as i64, result_json],
            )
            .map_err(sqlite_err)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_cmd(path: &str) -> BatchCommand {
        BatchCommand::UpsertFile {
            path: path.to_string(),
            content_hash: 42,
            size: 100,
            language: Some("typescript".to_string()),
            mtime_secs: 0,
            mtime_nanos: 0,
            scan_error: None,
        }
    }

    #[test]
    fn drain_commits_everything_before_close() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let (sender, writer) = BatchWriter::spawn(store.clone(), 16, 4);

        for i in 0..25 {
            sender.send(file_cmd(&format!("src/f{i}.ts"))).unwrap();
        }
        drop(sender);
        let applied = writer.close().unwrap();
        assert_eq!(applied, 25);

        let count: i64 = store
            .with_reader(|conn| {
                conn.query_row("SELECT COUNT(*) FROM file_metadata", [], |r| r.get(0))
                    .map_err(crate::connection::sqlite_err)
            })
            .unwrap();
        assert_eq!(count, 25);
    }

    #[test]
    fn delete_cascades_owned_rows() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let (sender, writer) = BatchWriter::spawn(store.clone(), 16, 500);

        sender.send(file_cmd("src/a.ts")).unwrap();
        sender
            .send(BatchCommand::InsertFunction {
                file: "src/a.ts".to_string(),
                name: "handler".to_string(),
                qualified_name: "handler".to_string(),
                signature: None,
                body_hash: 7,
                start_line: 1,
                end_line: 10,
                is_entry_point: false,
                is_injectable: false,
                is_auth_handler: false,
                is_test: false,
                is_data_accessor: false,
            })
            .unwrap();
        sender
            .send(BatchCommand::DeleteFile {
                path: "src/a.ts".to_string(),
            })
            .unwrap();
        drop(sender);
        writer.close().unwrap();

        let functions: i64 = store
            .with_reader(|conn| {
                conn.query_row("SELECT COUNT(*) FROM functions", [], |r| r.get(0))
                    .map_err(crate::connection::sqlite_err)
            })
            .unwrap();
        assert_eq!(functions, 0);
    }
}
