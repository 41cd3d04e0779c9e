//! The detection engine: a single GAST pass per file dispatching every
//! applicable detector.

mod context;
mod toml_patterns;
mod types;

use std::sync::Arc;

use crate::detectors::DetectorRegistry;
use crate::gast::GastNode;
use crate::parsers::ParseResult;
use crate::scanner::Language;

pub use context::{DetectionContext, KindIndex};
pub use toml_patterns::{TomlRule, TomlRuleSet};
pub use types::{pattern_id_for, PatternCategory, PatternMatch, Severity};

/// Runs detectors over one file at a time. The GAST is walked exactly once
/// to build the kind index; detectors then read only the kinds they
/// subscribed to, keeping per-file cost O(nodes) + O(matches).
pub struct DetectionEngine {
    registry: Arc<DetectorRegistry>,
    toml_rules: TomlRuleSet,
}

impl DetectionEngine {
    pub fn new(registry: Arc<DetectorRegistry>, toml_rules: TomlRuleSet) -> Self {
        Self {
            registry,
            toml_rules,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(Arc::new(DetectorRegistry::with_defaults()), TomlRuleSet::default())
    }

    /// Detect over one parsed, normalized file.
    pub fn run_file(
        &self,
        file: &str,
        language: Language,
        parse: &ParseResult,
        gast: &GastNode,
    ) -> Vec<PatternMatch> {
        let ctx = DetectionContext::build(file, language, parse, gast);
        let mut matches = Vec::new();

        for detector in self.registry.for_language(language) {
            // A detector that panics loses its output for this file only.
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                detector.detect(&ctx)
            }));
            match result {
                Ok(found) => matches.extend(found),
                Err(_) => {
                    tracing::warn!(
                        detector = detector.id(),
                        file,
                        "detector panicked; output for this file discarded"
                    );
                }
            }
        }

        matches.extend(self.toml_rules.run(&ctx));
        matches
    }

    pub fn registry(&self) -> &DetectorRegistry {
        &self.registry
    }
}
