//! The two-phase boundary analyzer: learn over candidate files, then
//! detect with per-framework extractors, score, and filter.

use crate::parsers::ParseResult;

use super::extractors::extractor_for;
use super::learn::LearnedContext;
use super::sensitive::SensitiveFieldClassifier;
use super::types::{Boundary, BoundaryOperation, SensitiveField};

/// Confidence weights per the scoring model: table recognized 0.3, fields
/// parsed 0.2, operation determinable 0.2, framework matched 0.2, literal
/// source 0.1.
const W_TABLE: f64 = 0.3;
const W_FIELDS: f64 = 0.2;
const W_OPERATION: f64 = 0.2;
const W_FRAMEWORK: f64 = 0.2;
const W_LITERAL: f64 = 0.1;

const MIN_CONFIDENCE: f64 = 0.30;

const TEST_PATH_MARKERS: &[&str] = &[
    "test", "spec", "__tests__", "__mocks__", "mock", "fixture", "fake", "stub",
];

pub struct BoundaryAnalyzer {
    learned: LearnedContext,
    classifier: SensitiveFieldClassifier,
}

impl BoundaryAnalyzer {
    /// Phase 1: learn from files likely to contain data-access code.
    pub fn learn(parses: &[ParseResult]) -> Self {
        let candidates: Vec<&ParseResult> = parses
            .iter()
            .filter(|p| LearnedContext::is_data_access_candidate(p))
            .collect();
        Self {
            learned: LearnedContext::learn(&candidates),
            classifier: SensitiveFieldClassifier::new(),
        }
    }

    pub fn learned(&self) -> &LearnedContext {
        &self.learned
    }

    /// Phase 2: detect access points in one file.
    pub fn detect(&self, parse: &ParseResult) -> Vec<Boundary> {
        if is_test_artifact(&parse.file) {
            return Vec::new();
        }

        let mut boundaries = Vec::new();
        for framework in &self.learned.frameworks {
            for mut boundary in extractor_for(*framework).extract(parse, &self.learned) {
                boundary.confidence = self.score(&boundary);
                if boundary.confidence >= MIN_CONFIDENCE && !boundary.table.is_empty() {
                    boundaries.push(boundary);
                }
            }
        }
        boundaries
    }

    /// Sensitivity classification over a detected boundary's fields.
    pub fn classify_fields(&self, boundary: &Boundary) -> Vec<SensitiveField> {
        boundary
            .fields
            .iter()
            .filter_map(|field| {
                let (class, confidence) = self.classifier.classify(field)?;
                Some(SensitiveField {
                    field: field.clone(),
                    table: Some(boundary.table.clone()),
                    class,
                    confidence,
                    file: boundary.file.clone(),
                    line: boundary.line,
                })
            })
            .collect()
    }

    fn score(&self, boundary: &Boundary) -> f64 {
        let mut score = 0.0;
        if self.learned.known_tables.contains(&boundary.table)
            || self.learned.variable_tables.values().any(|t| t == &boundary.table)
        {
            score += W_TABLE;
        }
        if !boundary.fields.is_empty() {
            score += W_FIELDS;
        }
        if boundary.operation != BoundaryOperation::Unknown {
            score += W_OPERATION;
        }
        if self.learned.frameworks.contains(&boundary.framework) {
            score += W_FRAMEWORK;
        }
        // Extractors only emit literal tables today; variable-derived
        // tables arrive through variable_tables and skip this weight.
        if !boundary.table.is_empty() {
            score += W_LITERAL;
        }
        score
    }
}

fn is_test_artifact(file: &str) -> bool {
    let lower = file.to_lowercase();
    TEST_PATH_MARKERS.iter().any(|marker| lower.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::types::CallSite;
    use crate::scanner::Language;

    fn prisma_file(file: &str) -> ParseResult {
        let mut parse = ParseResult::empty(file.to_string(), Language::TypeScript, 1);
        parse.imports.push(crate::parsers::types::ImportInfo {
            raw: "import { PrismaClient } from '@prisma/client'".into(),
            module: "@prisma/client".into(),
            names: smallvec::SmallVec::new(),
            is_type_only: false,
            line: 0,
        });
        parse.call_sites.push(CallSite {
            name: "findMany".into(),
            receiver: Some("prisma.user".into()),
            line: 12,
            column: 4,
            argument_count: 1,
            caller: Some("listUsers".into()),
        });
        parse
    }

    #[test]
    fn learn_then_detect_prisma_access() {
        let parses = vec![prisma_file("src/repo/users.ts")];
        let analyzer = BoundaryAnalyzer::learn(&parses);
        let boundaries = analyzer.detect(&parses[0]);

        assert_eq!(boundaries.len(), 1);
        let boundary = &boundaries[0];
        assert_eq!(boundary.table, "user");
        assert_eq!(boundary.operation, BoundaryOperation::Read);
        assert!(boundary.confidence >= 0.5, "got {}", boundary.confidence);
    }

    #[test]
    fn test_files_are_filtered() {
        let parses = vec![prisma_file("src/__tests__/users.test.ts")];
        let analyzer = BoundaryAnalyzer::learn(&parses);
        assert!(analyzer.detect(&parses[0]).is_empty());
    }
}
