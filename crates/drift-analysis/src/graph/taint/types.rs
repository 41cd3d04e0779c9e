//! Taint flow types. A flow is self-contained: its ordered steps render as
//! a standards-style code-flow trail without further lookups.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaintRole {
    Source,
    Propagator,
    Sanitizer,
    Sink,
}

impl TaintRole {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Propagator => "propagator",
            Self::Sanitizer => "sanitizer",
            Self::Sink => "sink",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaintStep {
    pub file: String,
    pub function: String,
    pub line: u32,
    pub role: TaintRole,
    pub snippet: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FlowSeverity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Default severity by weakness class.
    pub fn for_cwe(cwe: u32) -> Self {
        match cwe {
            89 | 78 | 94 | 502 => Self::Critical, // SQLi, cmd, code exec, deser
            79 | 918 | 22 => Self::High,          // XSS, SSRF, path traversal
            601 | 611 | 90 | 643 => Self::Medium,
            _ => Self::Medium,
        }
    }
}

/// One source-to-sink flow.
///
/// Invariant: the first step is a Source and the last a Sink, with zero or
/// more Propagator/Sanitizer steps between. A flow containing a sanitizer
/// step tagged for its sink's CWE is cleared before emission, so persisted
/// flows are always live findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaintFlow {
    pub steps: Vec<TaintStep>,
    pub cwe: u32,
    pub severity: FlowSeverity,
}

impl TaintFlow {
    pub fn source(&self) -> Option<&TaintStep> {
        self.steps.first().filter(|s| s.role == TaintRole::Source)
    }

    pub fn sink(&self) -> Option<&TaintStep> {
        self.steps.last().filter(|s| s.role == TaintRole::Sink)
    }

    /// Structural validity per the invariant above.
    pub fn is_well_formed(&self) -> bool {
        self.steps.len() >= 2
            && self.steps.first().map(|s| s.role) == Some(TaintRole::Source)
            && self.steps.last().map(|s| s.role) == Some(TaintRole::Sink)
            && self.steps[1..self.steps.len() - 1]
                .iter()
                .all(|s| matches!(s.role, TaintRole::Propagator | TaintRole::Sanitizer))
    }
}
