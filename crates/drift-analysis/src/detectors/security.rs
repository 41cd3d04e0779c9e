//! Security string detection: hardcoded secrets and raw SQL assembly.
//! Runs on extracted string literals only, never raw source.

use regex::Regex;

use crate::engine::{pattern_id_for, DetectionContext, PatternCategory, PatternMatch};
use crate::gast::GastKind;

use super::traits::{Detector, DetectorVariant};

pub struct SecurityStringsDetector {
    secret_patterns: Vec<(&'static str, Regex)>,
    sql_head: Regex,
}

impl SecurityStringsDetector {
    pub fn new() -> Self {
        let secret_patterns = vec![
            ("aws-access-key", Regex::new(r"\bAKIA[0-9A-Z]{16}\b").unwrap()),
            (
                "private-key-block",
                Regex::new(r"-----BEGIN (?:RSA |EC )?PRIVATE KEY-----").unwrap(),
            ),
            (
                "url-credentials",
                Regex::new(r"://[^/\s:]+:[^@\s]+@").unwrap(),
            ),
            (
                "bearer-token",
                Regex::new(r"(?i)bearer\s+[a-z0-9_\-\.=]{24,}").unwrap(),
            ),
        ];
        Self {
            secret_patterns,
            sql_head: Regex::new(r"(?i)^\s*(select|insert|update|delete)\b").unwrap(),
        }
    }
}

impl Default for SecurityStringsDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for SecurityStringsDetector {
    fn id(&self) -> &'static str {
        "security-strings"
    }

    fn category(&self) -> PatternCategory {
        PatternCategory::Security
    }

    fn variant(&self) -> DetectorVariant {
        DetectorVariant::Base
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<PatternMatch> {
        let mut matches = Vec::new();

        for lit in &ctx.parse.string_literals {
            for (body, pattern) in &self.secret_patterns {
                if pattern.is_match(&lit.value) {
                    matches.push(PatternMatch {
                        pattern_id: pattern_id_for(self.id(), body),
                        detector_id: self.id().to_string(),
                        category: self.category(),
                        file: ctx.file.to_string(),
                        line: lit.line,
                        column: lit.column,
                        confidence: 0.95,
                        // Never echo the secret itself.
                        snippet: Some(format!("<{body}>")),
                    });
                    break;
                }
            }
        }

        // SQL assembled inside template literals interpolates user data
        // into the query string.
        for node in ctx.kinds.nodes(&GastKind::TemplateLit) {
            if let Some(text) = &node.text {
                if self.sql_head.is_match(text.trim_start_matches(['`', '"'])) {
                    matches.push(PatternMatch {
                        pattern_id: pattern_id_for(self.id(), "sql-in-template"),
                        detector_id: self.id().to_string(),
                        category: self.category(),
                        file: ctx.file.to_string(),
                        line: node.range.start_line,
                        column: node.range.start_col,
                        confidence: 0.85,
                        snippet: None,
                    });
                }
            }
        }

        matches
    }
}
