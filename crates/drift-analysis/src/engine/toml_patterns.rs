//! Project-local TOML pattern rules - detectors added without recompiling.
//!
//! A rule declares exactly one of:
//! - `query`: a tree expression `<gast_kind>:<regex>` matched against
//!   normalized nodes of that kind (the regex runs on the node's text), or
//! - `regex`: matched against extracted string literals only, keeping
//!   regex work bounded by literal count rather than file size.

use serde::Deserialize;

use drift_core::errors::DetectionError;

use crate::scanner::Language;

use super::context::DetectionContext;
use super::types::{pattern_id_for, PatternCategory, PatternMatch};

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    patterns: Vec<RuleDef>,
}

#[derive(Debug, Deserialize)]
struct RuleDef {
    id: String,
    language: String,
    category: String,
    #[serde(default = "default_confidence")]
    confidence: f64,
    query: Option<String>,
    regex: Option<String>,
}

fn default_confidence() -> f64 {
    0.70
}

/// A compiled rule.
pub struct TomlRule {
    pub id: String,
    pub language: Option<Language>,
    pub category: PatternCategory,
    pub confidence: f64,
    body: RuleBody,
    pattern_id: String,
}

enum RuleBody {
    /// Match nodes of a GAST kind whose text matches the regex.
    NodeQuery { kind_name: String, text: regex::Regex },
    /// Match extracted string literals.
    StringRegex(regex::Regex),
}

#[derive(Default)]
pub struct TomlRuleSet {
    rules: Vec<TomlRule>,
}

impl TomlRuleSet {
    /// Parse and compile a rule file. Malformed definitions fail the load;
    /// a rule with both or neither body is rejected.
    pub fn load_str(text: &str) -> Result<Self, DetectionError> {
        let file: RuleFile = toml::from_str(text)
            .map_err(|e| DetectionError::InvalidPattern(e.to_string()))?;

        let mut rules = Vec::with_capacity(file.patterns.len());
        for def in file.patterns {
            rules.push(compile(def)?);
        }
        Ok(Self { rules })
    }

    pub fn load_file(path: &std::path::Path) -> Result<Self, DetectionError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DetectionError::InvalidPattern(format!("read {}: {e}", path.display()))
        })?;
        Self::load_str(&text)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every applicable rule against one file's context.
    pub fn run(&self, ctx: &DetectionContext<'_>) -> Vec<PatternMatch> {
        let mut matches = Vec::new();
        for rule in &self.rules {
            if let Some(lang) = rule.language {
                if lang != ctx.language {
                    continue;
                }
            }
            match &rule.body {
                RuleBody::NodeQuery { kind_name, text } => {
                    for node in ctx.kinds.by_name(kind_name) {
                        let haystack = node.text.as_deref().or(node.name.as_deref());
                        if let Some(haystack) = haystack {
                            if text.is_match(haystack) {
                                matches.push(PatternMatch {
                                    pattern_id: rule.pattern_id.clone(),
                                    detector_id: rule.id.clone(),
                                    category: rule.category,
                                    file: ctx.file.to_string(),
                                    line: node.range.start_line,
                                    column: node.range.start_col,
                                    confidence: rule.confidence,
                                    snippet: Some(truncate(haystack, 120)),
                                });
                            }
                        }
                    }
                }
                RuleBody::StringRegex(re) => {
                    for lit in &ctx.parse.string_literals {
                        if re.is_match(&lit.value) {
                            matches.push(PatternMatch {
                                pattern_id: rule.pattern_id.clone(),
                                detector_id: rule.id.clone(),
                                category: rule.category,
                                file: ctx.file.to_string(),
                                line: lit.line,
                                column: lit.column,
                                confidence: rule.confidence,
                                snippet: Some(truncate(&lit.value, 120)),
                            });
                        }
                    }
                }
            }
        }
        matches
    }
}

fn compile(def: RuleDef) -> Result<TomlRule, DetectionError> {
    let category = PatternCategory::parse_name(&def.category).ok_or_else(|| {
        DetectionError::InvalidPattern(format!(
            "unknown category '{}' in rule '{}'",
            def.category, def.id
        ))
    })?;

    let language = match def.language.as_str() {
        "*" | "" => None,
        name => Some(Language::parse_name(name).ok_or_else(|| {
            DetectionError::InvalidPattern(format!(
                "unknown language '{name}' in rule '{}'",
                def.id
            ))
        })?),
    };

    let body = match (&def.query, &def.regex) {
        (Some(query), None) => {
            let (kind_name, pattern) =
                query
                    .split_once(':')
                    .ok_or_else(|| DetectionError::InvalidPattern(format!(
                        "rule '{}' query must be '<kind>:<regex>'",
                        def.id
                    )))?;
            RuleBody::NodeQuery {
                kind_name: kind_name.trim().to_string(),
                text: compile_regex(&def.id, pattern)?,
            }
        }
        (None, Some(regex)) => RuleBody::StringRegex(compile_regex(&def.id, regex)?),
        _ => {
            return Err(DetectionError::AmbiguousPatternBody { id: def.id });
        }
    };

    let body_key = match &body {
        RuleBody::NodeQuery { kind_name, text } => format!("{kind_name}:{}", text.as_str()),
        RuleBody::StringRegex(re) => re.as_str().to_string(),
    };

    Ok(TomlRule {
        pattern_id: pattern_id_for(&def.id, &body_key),
        id: def.id,
        language,
        category,
        confidence: def.confidence.clamp(0.0, 1.0),
        body,
    })
}

fn compile_regex(rule_id: &str, pattern: &str) -> Result<regex::Regex, DetectionError> {
    regex::Regex::new(pattern.trim())
        .map_err(|e| DetectionError::InvalidPattern(format!("rule '{rule_id}': {e}")))
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s[..end].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_rule_with_both_bodies() {
        let toml = r#"
[[patterns]]
id = "bad"
language = "typescript"
category = "security"
query = "call:^eval$"
regex = "eval"
"#;
        assert!(TomlRuleSet::load_str(toml).is_err());
    }

    #[test]
    fn rejects_rule_with_neither_body() {
        let toml = r#"
[[patterns]]
id = "empty"
language = "typescript"
category = "security"
"#;
        assert!(TomlRuleSet::load_str(toml).is_err());
    }

    #[test]
    fn compiles_query_and_regex_rules() {
        let toml = r#"
[[patterns]]
id = "raw-eval"
language = "javascript"
category = "security"
confidence = 0.9
query = "call:^eval$"

[[patterns]]
id = "aws-key"
language = "*"
category = "security"
regex = "AKIA[0-9A-Z]{16}"
"#;
        let rules = TomlRuleSet::load_str(toml).unwrap();
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn unknown_category_rejected() {
        let toml = r#"
[[patterns]]
id = "x"
language = "*"
category = "nonsense"
regex = "a"
"#;
        assert!(TomlRuleSet::load_str(toml).is_err());
    }
}
