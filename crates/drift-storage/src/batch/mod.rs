//! Batch ingest: a bounded channel feeding a dedicated writer thread.
//!
//! Producers block when the channel is full (backpressure). The writer
//! groups queued commands into `BEGIN IMMEDIATE` transactions of up to the
//! configured row count and exits only after the channel closes and every
//! queued command has committed.

mod commands;
mod writer;

pub use commands::BatchCommand;
pub use writer::{BatchSender, BatchWriter};
