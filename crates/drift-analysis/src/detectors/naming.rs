//! Naming-style learning detector.
//!
//! Learns the dominant function naming style per language in the first
//! pass, then emits one match per function tagged with the style it uses.
//! The aggregation and learning layers decide downstream whether the
//! minority style is a deviation or the gene is contested.

use std::sync::RwLock;

use drift_core::types::collections::FxHashMap;

use crate::engine::{pattern_id_for, DetectionContext, PatternCategory, PatternMatch};
use crate::parsers::ParseResult;
use crate::scanner::Language;

use super::traits::{Detector, DetectorVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamingStyle {
    Camel,
    Snake,
    Pascal,
    Mixed,
}

impl NamingStyle {
    pub fn of(name: &str) -> NamingStyle {
        let has_underscore = name.contains('_');
        let first_upper = name.chars().next().is_some_and(|c| c.is_uppercase());
        let has_upper = name.chars().any(|c| c.is_uppercase());

        match (has_underscore, first_upper, has_upper) {
            (false, false, true) => NamingStyle::Camel,
            (false, false, false) => NamingStyle::Camel, // single lowercase word
            (false, true, _) => NamingStyle::Pascal,
            (true, false, false) => NamingStyle::Snake,
            _ => NamingStyle::Mixed,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NamingStyle::Camel => "camel_case",
            NamingStyle::Snake => "snake_case",
            NamingStyle::Pascal => "pascal_case",
            NamingStyle::Mixed => "mixed",
        }
    }
}

pub struct NamingDetector {
    /// Style histogram per language, filled by `learn`.
    learned: RwLock<FxHashMap<Language, FxHashMap<NamingStyle, u32>>>,
}

impl NamingDetector {
    pub fn new() -> Self {
        Self {
            learned: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn dominant(&self, language: Language) -> Option<NamingStyle> {
        let learned = self.learned.read().ok()?;
        learned
            .get(&language)?
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(style, _)| *style)
    }
}

impl Default for NamingDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for NamingDetector {
    fn id(&self) -> &'static str {
        "naming-style"
    }

    fn category(&self) -> PatternCategory {
        PatternCategory::Structural
    }

    fn variant(&self) -> DetectorVariant {
        DetectorVariant::Learning
    }

    fn learn(&self, project: &[ParseResult]) {
        let mut learned = match self.learned.write() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        learned.clear();
        for parse in project {
            let histogram = learned.entry(parse.language).or_default();
            for function in &parse.functions {
                *histogram.entry(NamingStyle::of(&function.name)).or_insert(0) += 1;
            }
        }
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<PatternMatch> {
        let dominant = self.dominant(ctx.language);

        ctx.parse
            .functions
            .iter()
            .map(|function| {
                let style = NamingStyle::of(&function.name);
                // Matching the dominant style is stronger evidence that the
                // style is the convention.
                let confidence = match dominant {
                    Some(d) if d == style => 0.9,
                    Some(_) => 0.6,
                    None => 0.7,
                };
                PatternMatch {
                    pattern_id: pattern_id_for(self.id(), style.name()),
                    detector_id: self.id().to_string(),
                    category: self.category(),
                    file: ctx.file.to_string(),
                    line: function.start_line,
                    column: 0,
                    confidence,
                    snippet: Some(function.name.clone()),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_styles() {
        assert_eq!(NamingStyle::of("getUser"), NamingStyle::Camel);
        assert_eq!(NamingStyle::of("get_user"), NamingStyle::Snake);
        assert_eq!(NamingStyle::of("GetUser"), NamingStyle::Pascal);
        assert_eq!(NamingStyle::of("get_User"), NamingStyle::Mixed);
        assert_eq!(NamingStyle::of("main"), NamingStyle::Camel);
    }
}
