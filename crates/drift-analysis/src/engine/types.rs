//! Pattern match types shared by detectors and the intelligence layers.

use serde::{Deserialize, Serialize};

use crate::scanner::hash_bytes;

/// The sixteen pattern categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    Api,
    Auth,
    Data,
    Error,
    Test,
    Security,
    Structural,
    Performance,
    Logging,
    Validation,
    Types,
    Components,
    Config,
    Styling,
    Documentation,
    Accessibility,
}

impl PatternCategory {
    pub const ALL: [PatternCategory; 16] = [
        Self::Api,
        Self::Auth,
        Self::Data,
        Self::Error,
        Self::Test,
        Self::Security,
        Self::Structural,
        Self::Performance,
        Self::Logging,
        Self::Validation,
        Self::Types,
        Self::Components,
        Self::Config,
        Self::Styling,
        Self::Documentation,
        Self::Accessibility,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Auth => "auth",
            Self::Data => "data",
            Self::Error => "error",
            Self::Test => "test",
            Self::Security => "security",
            Self::Structural => "structural",
            Self::Performance => "performance",
            Self::Logging => "logging",
            Self::Validation => "validation",
            Self::Types => "types",
            Self::Components => "components",
            Self::Config => "config",
            Self::Styling => "styling",
            Self::Documentation => "documentation",
            Self::Accessibility => "accessibility",
        }
    }

    pub fn parse_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}

impl std::fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Violation severity as exposed in derived outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Hint => "hint",
        }
    }
}

/// One detector observation at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    /// Stable id derived from detector id + pattern body.
    pub pattern_id: String,
    pub detector_id: String,
    pub category: PatternCategory,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub confidence: f64,
    pub snippet: Option<String>,
}

/// Stable pattern id: the detector that owns the pattern plus a hash of the
/// pattern body (not the match site), so the same regularity aggregates
/// across files and scans.
pub fn pattern_id_for(detector_id: &str, pattern_body: &str) -> String {
    let hash = hash_bytes(format!("{detector_id}\u{1}{pattern_body}").as_bytes());
    format!("{detector_id}:{hash:016x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_id_stable_and_distinct() {
        let a = pattern_id_for("naming", "camel_case");
        let b = pattern_id_for("naming", "camel_case");
        let c = pattern_id_for("naming", "snake_case");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn category_names_round_trip() {
        for cat in PatternCategory::ALL {
            assert_eq!(PatternCategory::parse_name(cat.name()), Some(cat));
        }
    }
}
