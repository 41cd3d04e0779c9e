//! End-to-end pipeline tests against a real temporary project and an
//! on-disk store.

use std::path::Path;
use std::sync::Arc;

use drift_analysis::ScanPipeline;
use drift_core::config::DriftConfig;
use drift_core::errors::ScanStatus;
use drift_core::events::EventDispatcher;
use drift_core::CancellationToken;
use drift_storage::{materialized, Store};

fn write_project(dir: &Path) {
    std::fs::write(
        dir.join("a.ts"),
        "export function alpha() {\n    return beta();\n}\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("b.ts"),
        "export function beta() {\n    return 2;\n}\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("c.ts"),
        "export function gamma() {\n    return 3;\n}\n",
    )
    .unwrap();
}

fn pipeline(store: Arc<Store>) -> ScanPipeline {
    ScanPipeline::new(
        store,
        DriftConfig::default(),
        Arc::new(EventDispatcher::new()),
        CancellationToken::new(),
    )
}

fn base_table_counts(store: &Store) -> (i64, i64, i64) {
    store
        .with_reader(|conn| {
            let files: i64 = conn
                .query_row("SELECT COUNT(*) FROM file_metadata", [], |r| r.get(0))
                .map_err(|e| drift_core::errors::StorageError::Sqlite {
                    message: e.to_string(),
                })?;
            let functions: i64 = conn
                .query_row("SELECT COUNT(*) FROM functions", [], |r| r.get(0))
                .map_err(|e| drift_core::errors::StorageError::Sqlite {
                    message: e.to_string(),
                })?;
            let locations: i64 = conn
                .query_row("SELECT COUNT(*) FROM pattern_locations", [], |r| r.get(0))
                .map_err(|e| drift_core::errors::StorageError::Sqlite {
                    message: e.to_string(),
                })?;
            Ok((files, functions, locations))
        })
        .unwrap()
}

#[test]
fn full_scan_then_unchanged_rescan_is_a_no_op() {
    let project = tempfile::tempdir().unwrap();
    write_project(project.path());
    let db_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open(&db_dir.path().join("drift.db"), 2).unwrap());

    // First scan: three added files, functions extracted, status row set.
    let first = pipeline(store.clone()).run(project.path()).unwrap();
    assert_eq!(first.status, ScanStatus::Completed);
    assert_eq!(first.files_added, 3);

    let (files, functions, locations) = base_table_counts(&store);
    assert_eq!(files, 3);
    assert!(functions >= 3, "expected extracted functions, got {functions}");

    let status = store
        .with_reader(materialized::load_status)
        .unwrap()
        .expect("status row after scan");
    assert_eq!(status.file_count, 3);

    // Second scan, nothing touched: all three unchanged, zero new rows in
    // base tables.
    let second = pipeline(store.clone()).run(project.path()).unwrap();
    assert_eq!(second.status, ScanStatus::Completed);
    assert_eq!(second.files_added, 0);
    assert_eq!(second.files_modified, 0);
    assert_eq!(second.files_unchanged, 3);

    let after = base_table_counts(&store);
    assert_eq!(after, (files, functions, locations), "unchanged rescan wrote rows");

    let status = store
        .with_reader(materialized::load_status)
        .unwrap()
        .unwrap();
    assert_eq!(status.file_count, 3);
}

#[test]
fn modified_file_rederives_only_its_rows() {
    let project = tempfile::tempdir().unwrap();
    write_project(project.path());
    let db_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open(&db_dir.path().join("drift.db"), 2).unwrap());

    pipeline(store.clone()).run(project.path()).unwrap();

    // Rewrite c.ts with a different function.
    std::fs::write(
        project.path().join("c.ts"),
        "export function gammaPrime() {\n    return 30;\n}\n",
    )
    .unwrap();
    let outcome = pipeline(store.clone()).run(project.path()).unwrap();
    assert_eq!(outcome.files_modified, 1);
    assert_eq!(outcome.files_unchanged, 2);

    let names: Vec<String> = store
        .with_reader(|conn| {
            let mut stmt = conn
                .prepare("SELECT qualified_name FROM functions WHERE file = 'c.ts'")
                .map_err(|e| drift_core::errors::StorageError::Sqlite {
                    message: e.to_string(),
                })?;
            let rows = stmt
                .query_map([], |r| r.get::<_, String>(0))
                .map_err(|e| drift_core::errors::StorageError::Sqlite {
                    message: e.to_string(),
                })?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| drift_core::errors::StorageError::Sqlite {
                    message: e.to_string(),
                })?;
            Ok(rows)
        })
        .unwrap();
    assert_eq!(names, vec!["gammaPrime".to_string()]);
}

#[test]
fn deleted_file_cascades_its_facts() {
    let project = tempfile::tempdir().unwrap();
    write_project(project.path());
    let db_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open(&db_dir.path().join("drift.db"), 2).unwrap());

    pipeline(store.clone()).run(project.path()).unwrap();
    std::fs::remove_file(project.path().join("c.ts")).unwrap();

    let outcome = pipeline(store.clone()).run(project.path()).unwrap();
    assert_eq!(outcome.files_deleted, 1);

    let (files, _, _) = base_table_counts(&store);
    assert_eq!(files, 2);

    let orphaned: i64 = store
        .with_reader(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM functions WHERE file = 'c.ts'",
                [],
                |r| r.get(0),
            )
            .map_err(|e| drift_core::errors::StorageError::Sqlite {
                message: e.to_string(),
            })
        })
        .unwrap();
    assert_eq!(orphaned, 0);
}

#[test]
fn cancelled_before_start_reports_cancelled() {
    let project = tempfile::tempdir().unwrap();
    write_project(project.path());
    let db_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open(&db_dir.path().join("drift.db"), 2).unwrap());

    let cancel = CancellationToken::new();
    cancel.cancel();
    let pipeline = ScanPipeline::new(
        store,
        DriftConfig::default(),
        Arc::new(EventDispatcher::new()),
        cancel,
    );
    let outcome = pipeline.run(project.path()).unwrap();
    assert_eq!(outcome.status, ScanStatus::Cancelled);
}

#[test]
fn same_file_definition_beats_import_in_call_graph() {
    let project = tempfile::tempdir().unwrap();
    std::fs::write(
        project.path().join("m.ts"),
        "export function foo() { return 1; }\n",
    )
    .unwrap();
    std::fs::write(
        project.path().join("main.ts"),
        "import { foo } from './m';\nfunction foo() { return 2; }\nfunction run() { foo(); }\n",
    )
    .unwrap();
    let db_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open(&db_dir.path().join("drift.db"), 2).unwrap());

    pipeline(store.clone()).run(project.path()).unwrap();

    let (resolution, confidence): (String, f64) = store
        .with_reader(|conn| {
            conn.query_row(
                "SELECT ce.resolution, ce.confidence
                 FROM call_edges ce
                 JOIN functions caller ON caller.id = ce.caller_id
                 JOIN functions callee ON callee.id = ce.callee_id
                 WHERE caller.qualified_name = 'run'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .map_err(|e| drift_core::errors::StorageError::Sqlite {
                message: e.to_string(),
            })
        })
        .unwrap();
    assert_eq!(resolution, "same_file");
    assert!(confidence >= 0.95);

    let callee_file: String = store
        .with_reader(|conn| {
            conn.query_row(
                "SELECT callee.file FROM call_edges ce
                 JOIN functions caller ON caller.id = ce.caller_id
                 JOIN functions callee ON callee.id = ce.callee_id
                 WHERE caller.qualified_name = 'run'",
                [],
                |r| r.get(0),
            )
            .map_err(|e| drift_core::errors::StorageError::Sqlite {
                message: e.to_string(),
            })
        })
        .unwrap();
    assert_eq!(callee_file, "main.ts");
}
