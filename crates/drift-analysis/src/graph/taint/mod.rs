//! Taint analysis: TOML-driven sources/sinks/sanitizers/propagators,
//! intraprocedural dataflow, then interprocedural summary propagation.

mod interprocedural;
mod intraprocedural;
mod registry;
mod types;

pub use interprocedural::{propagate_summaries, FunctionSummary};
pub use intraprocedural::{analyze_function, IntraproceduralResult};
pub use registry::TaintRegistry;
pub use types::{FlowSeverity, TaintFlow, TaintRole, TaintStep};
