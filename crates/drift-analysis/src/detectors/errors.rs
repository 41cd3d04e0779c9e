//! Error-handling pattern detector.

use crate::engine::{pattern_id_for, DetectionContext, PatternCategory, PatternMatch};
use crate::gast::GastKind;

use super::traits::{Detector, DetectorVariant};

pub struct ErrorHandlingDetector;

impl Detector for ErrorHandlingDetector {
    fn id(&self) -> &'static str {
        "error-handling"
    }

    fn category(&self) -> PatternCategory {
        PatternCategory::Error
    }

    fn variant(&self) -> DetectorVariant {
        DetectorVariant::Base
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<PatternMatch> {
        let mut matches = Vec::new();

        for node in ctx.kinds.nodes(&GastKind::TryCatch) {
            // A try with no substance is swallowing rather than handling.
            let body = node.children.iter().map(|c| c.node_count()).sum::<usize>();
            let (body_key, confidence) = if body <= 1 {
                ("empty-catch", 0.85)
            } else {
                ("structured-try", 0.8)
            };
            matches.push(self.emit(ctx, body_key, confidence, node.range.start_line));
        }

        for node in ctx.kinds.nodes(&GastKind::Throw) {
            matches.push(self.emit(ctx, "throw", 0.75, node.range.start_line));
        }

        // Rust-specific: unwrap in non-test code bypasses error propagation.
        for node in ctx.kinds.nodes(&GastKind::Call) {
            if let Some(text) = &node.text {
                if text.ends_with(".unwrap") || text.ends_with(".expect") {
                    matches.push(self.emit(ctx, "unwrap", 0.8, node.range.start_line));
                }
            }
        }

        matches
    }
}

impl ErrorHandlingDetector {
    fn emit(
        &self,
        ctx: &DetectionContext<'_>,
        body: &str,
        confidence: f64,
        line: u32,
    ) -> PatternMatch {
        PatternMatch {
            pattern_id: pattern_id_for(self.id(), body),
            detector_id: self.id().to_string(),
            category: self.category(),
            file: ctx.file.to_string(),
            line,
            column: 0,
            confidence,
            snippet: None,
        }
    }
}
