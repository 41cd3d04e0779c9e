//! The drift analysis engine.
//!
//! A full scan flows: scanner → parser manager (cached) → detection engine
//! (parallel, per file) → resolution index → boundary analyzer → call graph
//! → aggregation → confidence → outliers + convention learning → graph
//! intelligence → gold refresh. Incremental scans re-derive only facts
//! owned by changed files.

pub mod boundaries;
pub mod call_graph;
pub mod detectors;
pub mod engine;
pub mod gast;
pub mod graph;
pub mod parsers;
pub mod patterns;
pub mod pipeline;
pub mod resolution;
pub mod scanner;

pub use pipeline::{ScanOutcome, ScanPipeline};
