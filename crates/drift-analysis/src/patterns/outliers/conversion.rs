//! Outlier → violation conversion. Each outlier becomes at most one
//! violation, scoped to its file and line, with a content-based fingerprint
//! that survives reformatting of the surrounding code.

use drift_core::types::collections::FxHashSet;

use crate::engine::Severity;
use crate::patterns::aggregation::AggregatedPattern;
use crate::scanner::hash_bytes;

use super::types::{OutlierFinding, Significance};

#[derive(Debug, Clone)]
pub struct Violation {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub pattern_id: String,
    pub severity: Severity,
    pub message: String,
    pub fingerprint: String,
    pub is_new: bool,
    pub cwe_id: Option<u32>,
}

/// Fingerprint from what the violation IS, not where it sits: pattern id
/// plus the normalized snippet (whitespace collapsed). Reformatting moves
/// lines, not fingerprints.
pub fn violation_fingerprint(pattern_id: &str, snippet: Option<&str>, file: &str) -> String {
    let normalized: String = snippet
        .unwrap_or("")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let basis = format!("{pattern_id}\u{1}{file}\u{1}{normalized}");
    format!("{:016x}", hash_bytes(basis.as_bytes()))
}

/// Convert one pattern's findings. `findings` index into the pattern's
/// per-file count sample, so the file at that index owns the violation.
pub fn outliers_to_violations(
    pattern: &AggregatedPattern,
    findings: &[OutlierFinding],
    known_fingerprints: &FxHashSet<String>,
) -> Vec<Violation> {
    let per_file = pattern.per_file_counts();
    let mut emitted: FxHashSet<usize> = FxHashSet::default();
    let mut violations = Vec::new();

    for finding in findings {
        // One violation per outlier, even if a method reported twice.
        if !emitted.insert(finding.index) {
            continue;
        }
        let Some((file, _)) = per_file.get(finding.index) else {
            continue;
        };
        // Anchor to the first location in the deviating file.
        let location = pattern.locations.iter().find(|l| &l.file == file);
        let (line, column, snippet) = match location {
            Some(l) => (l.line, l.column, l.snippet.as_deref()),
            None => (0, 0, None),
        };

        let fingerprint = violation_fingerprint(&pattern.pattern_id, snippet, file);
        let is_new = !known_fingerprints.contains(&fingerprint);

        violations.push(Violation {
            file: file.clone(),
            line,
            column,
            pattern_id: pattern.pattern_id.clone(),
            severity: severity_of(finding.significance),
            message: format!(
                "deviates from pattern {} ({} significance, {} method)",
                pattern.pattern_id,
                finding.significance.name(),
                finding.method.name()
            ),
            fingerprint,
            is_new,
            cwe_id: None,
        });
    }
    violations
}

fn severity_of(significance: Significance) -> Severity {
    match significance {
        Significance::Critical => Severity::Error,
        Significance::High => Severity::Warning,
        Significance::Moderate => Severity::Info,
        Significance::Low => Severity::Hint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PatternCategory;
    use crate::patterns::aggregation::PatternLocation;
    use crate::patterns::outliers::types::{Deviation, OutlierMethod};

    fn pattern_with_files(files: &[(&str, u32)]) -> AggregatedPattern {
        let mut p = AggregatedPattern::new(
            "p".to_string(),
            "d".to_string(),
            PatternCategory::Structural,
        );
        for (file, count) in files {
            for i in 0..*count {
                p.locations.push(PatternLocation {
                    file: file.to_string(),
                    line: i,
                    column: 0,
                    confidence: 0.8,
                    is_outlier: false,
                    snippet: Some(format!("snippet in {file}")),
                });
            }
        }
        p.reconcile();
        p
    }

    fn finding(index: usize, deviation: f64) -> OutlierFinding {
        let d = Deviation::new(deviation);
        OutlierFinding {
            index,
            value: 0.0,
            statistic: 0.0,
            deviation: d,
            significance: Significance::from_deviation(d),
            method: OutlierMethod::ZScore,
        }
    }

    #[test]
    fn one_violation_per_outlier() {
        let pattern = pattern_with_files(&[("a.ts", 2), ("b.ts", 30)]);
        let findings = vec![finding(1, 0.95), finding(1, 0.95)];
        let violations = outliers_to_violations(&pattern, &findings, &FxHashSet::default());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Error);
    }

    #[test]
    fn fingerprint_ignores_line_position() {
        let a = violation_fingerprint("p", Some("const  x =\n  1"), "a.ts");
        let b = violation_fingerprint("p", Some("const x = 1"), "a.ts");
        assert_eq!(a, b);
    }

    #[test]
    fn known_fingerprint_is_not_new() {
        let pattern = pattern_with_files(&[("a.ts", 1)]);
        let findings = vec![finding(0, 0.8)];

        let first = outliers_to_violations(&pattern, &findings, &FxHashSet::default());
        assert!(first[0].is_new);

        let known: FxHashSet<String> =
            first.iter().map(|v| v.fingerprint.clone()).collect();
        let second = outliers_to_violations(&pattern, &findings, &known);
        assert!(!second[0].is_new);
    }
}
