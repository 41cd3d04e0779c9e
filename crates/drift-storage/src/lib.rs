//! Embedded relational store for the drift engine.
//!
//! One SQLite file per project (`drift.db`, WAL mode). Exactly one writer
//! connection behind a mutex; a fixed pool of `query_only` readers; a
//! bounded batch-ingest channel feeding a dedicated writer thread. All
//! derived tables are a pure function of the base tables and can be rebuilt.

pub mod backup;
pub mod batch;
pub mod connection;
pub mod lock;
pub mod materialized;
pub mod migrations;
pub mod pagination;
pub mod queries;
pub mod retention;

pub use batch::{BatchCommand, BatchSender, BatchWriter};
pub use connection::Store;
pub use lock::AdvisoryLock;
pub use pagination::{Cursor, Page};
