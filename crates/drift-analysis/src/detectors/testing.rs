//! Test detection: which functions are tests, and with which framework.
//! The test-topology layer reuses `test_framework_of` for its mapping.

use crate::engine::{pattern_id_for, DetectionContext, PatternCategory, PatternMatch};
use crate::parsers::{types::FunctionInfo, ParseResult};
use crate::scanner::Language;

use super::traits::{Detector, DetectorVariant};

/// Identify the test framework a function belongs to, if any.
pub fn test_framework_of(
    function: &FunctionInfo,
    parse: &ParseResult,
) -> Option<&'static str> {
    let language = parse.language;
    let name = function.name.as_str();

    match language {
        Language::Python => {
            if name.starts_with("test_") || function.decorators.iter().any(|d| d.contains("pytest"))
            {
                return Some("pytest");
            }
        }
        Language::Java => {
            if function.decorators.iter().any(|d| d.contains("Test")) {
                return Some("junit");
            }
        }
        Language::Kotlin => {
            if function.decorators.iter().any(|d| d.contains("Test")) {
                return Some("kotest");
            }
        }
        Language::CSharp => {
            if function
                .decorators
                .iter()
                .any(|d| d.contains("Fact") || d.contains("Theory") || d.contains("Test"))
            {
                return Some("xunit");
            }
        }
        Language::Go => {
            if name.starts_with("Test") && function.parameters.len() == 1 {
                return Some("go-test");
            }
        }
        Language::Rust => {
            if function.decorators.iter().any(|d| d.contains("test")) {
                return Some("rust-test");
            }
        }
        Language::Ruby => {
            if parse.file.ends_with("_spec.rb") {
                return Some("rspec");
            }
        }
        Language::Php => {
            if name.starts_with("test") {
                return Some("phpunit");
            }
        }
        Language::TypeScript | Language::JavaScript => {}
    }

    // JS-family and fallthrough: test files hosting describe/it/test calls.
    if is_js_test_file(&parse.file)
        && parse
            .call_sites
            .iter()
            .any(|c| matches!(c.name.as_str(), "describe" | "it" | "test"))
    {
        return Some(js_framework_hint(parse));
    }
    None
}

fn is_js_test_file(file: &str) -> bool {
    file.contains(".test.") || file.contains(".spec.") || file.contains("__tests__")
}

fn js_framework_hint(parse: &ParseResult) -> &'static str {
    if parse.imports.iter().any(|i| i.module.contains("vitest")) {
        "vitest"
    } else if parse.imports.iter().any(|i| i.module.contains("mocha")) {
        "mocha"
    } else {
        "jest"
    }
}

pub struct TestingDetector;

impl Detector for TestingDetector {
    fn id(&self) -> &'static str {
        "test-functions"
    }

    fn category(&self) -> PatternCategory {
        PatternCategory::Test
    }

    fn variant(&self) -> DetectorVariant {
        DetectorVariant::Base
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<PatternMatch> {
        ctx.parse
            .functions
            .iter()
            .filter_map(|function| {
                let framework = test_framework_of(function, ctx.parse)?;
                Some(PatternMatch {
                    pattern_id: pattern_id_for(self.id(), framework),
                    detector_id: self.id().to_string(),
                    category: self.category(),
                    file: ctx.file.to_string(),
                    line: function.start_line,
                    column: 0,
                    confidence: 0.9,
                    snippet: Some(function.name.clone()),
                })
            })
            .collect()
    }
}
