//! The taint registry: compiled-in defaults plus a project-local TOML file
//! with `[[sources]]`, `[[sinks]]`, `[[sanitizers]]`, `[[propagators]]`.
//!
//! `match` is a substring tested against the callee/expression text
//! (`req.query`, `db.query`, ...). Sanitizers clear specific CWEs only -
//! a SQL escape does not clear an XSS sink.

use drift_core::errors::TaintError;
use serde::Deserialize;

/// Built-in entries covering the common web/data frameworks.
const DEFAULT_REGISTRY: &str = r#"
[[sources]]
framework = "express"
match = "req.query"
taint_label = "http_input"

[[sources]]
framework = "express"
match = "req.body"
taint_label = "http_input"

[[sources]]
framework = "express"
match = "req.params"
taint_label = "http_input"

[[sources]]
framework = "django"
match = "request.GET"
taint_label = "http_input"

[[sources]]
framework = "django"
match = "request.POST"
taint_label = "http_input"

[[sources]]
framework = "generic"
match = "process.env"
taint_label = "environment"

[[sources]]
framework = "generic"
match = "os.environ"
taint_label = "environment"

[[sinks]]
framework = "generic"
match = "db.query"
cwe = 89

[[sinks]]
framework = "generic"
match = "db.execute"
cwe = 89

[[sinks]]
framework = "generic"
match = "connection.query"
cwe = 89

[[sinks]]
framework = "generic"
match = "cursor.execute"
cwe = 89

[[sinks]]
framework = "node"
match = "child_process.exec"
cwe = 78

[[sinks]]
framework = "node"
match = "exec"
cwe = 78

[[sinks]]
framework = "generic"
match = "eval"
cwe = 94

[[sinks]]
framework = "dom"
match = "innerHTML"
cwe = 79

[[sinks]]
framework = "express"
match = "res.send"
cwe = 79

[[sinks]]
framework = "express"
match = "res.redirect"
cwe = 601

[[sinks]]
framework = "node"
match = "fs.readFile"
cwe = 22

[[sinks]]
framework = "node"
match = "fs.writeFile"
cwe = 22

[[sanitizers]]
framework = "generic"
match = "parameterize"
clears_cwes = [89]

[[sanitizers]]
framework = "generic"
match = "escapeSql"
clears_cwes = [89]

[[sanitizers]]
framework = "sequelize"
match = "bind"
clears_cwes = [89]

[[sanitizers]]
framework = "generic"
match = "escapeHtml"
clears_cwes = [79]

[[sanitizers]]
framework = "generic"
match = "sanitizeHtml"
clears_cwes = [79]

[[sanitizers]]
framework = "generic"
match = "encodeURIComponent"
clears_cwes = [79, 601]

[[sanitizers]]
framework = "generic"
match = "shellEscape"
clears_cwes = [78]

[[sanitizers]]
framework = "generic"
match = "parseInt"
clears_cwes = [89, 79, 78]

[[propagators]]
framework = "generic"
match = "concat"
arg_flow = "0->return"

[[propagators]]
framework = "generic"
match = "format"
arg_flow = "*->return"

[[propagators]]
framework = "generic"
match = "join"
arg_flow = "*->return"
"#;

#[derive(Debug, Clone, Deserialize)]
pub struct SourceEntry {
    pub framework: String,
    #[serde(rename = "match")]
    pub pattern: String,
    pub taint_label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SinkEntry {
    pub framework: String,
    #[serde(rename = "match")]
    pub pattern: String,
    pub cwe: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SanitizerEntry {
    pub framework: String,
    #[serde(rename = "match")]
    pub pattern: String,
    pub clears_cwes: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropagatorEntry {
    pub framework: String,
    #[serde(rename = "match")]
    pub pattern: String,
    /// `"<index>-><index|return>"` or `"*->return"`.
    pub arg_flow: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaintRegistry {
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    #[serde(default)]
    pub sinks: Vec<SinkEntry>,
    #[serde(default)]
    pub sanitizers: Vec<SanitizerEntry>,
    #[serde(default)]
    pub propagators: Vec<PropagatorEntry>,
}

impl TaintRegistry {
    /// The compiled-in default registry.
    pub fn builtin() -> Self {
        toml::from_str(DEFAULT_REGISTRY).expect("builtin taint registry is valid TOML")
    }

    pub fn from_str(text: &str) -> Result<Self, TaintError> {
        let registry: Self =
            toml::from_str(text).map_err(|e| TaintError::RegistryParse(e.to_string()))?;
        registry.validate()?;
        Ok(registry)
    }

    /// Builtin entries extended by a project-local file when present.
    pub fn load(project_file: Option<&std::path::Path>) -> Result<Self, TaintError> {
        let mut registry = Self::builtin();
        if let Some(path) = project_file {
            if path.exists() {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| TaintError::RegistryParse(e.to_string()))?;
                let extra = Self::from_str(&text)?;
                registry.sources.extend(extra.sources);
                registry.sinks.extend(extra.sinks);
                registry.sanitizers.extend(extra.sanitizers);
                registry.propagators.extend(extra.propagators);
            }
        }
        Ok(registry)
    }

    fn validate(&self) -> Result<(), TaintError> {
        for propagator in &self.propagators {
            parse_arg_flow(&propagator.arg_flow)?;
        }
        for source in &self.sources {
            if source.taint_label.is_empty() {
                return Err(TaintError::RegistryIncomplete {
                    entry: source.pattern.clone(),
                    field: "taint_label".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn match_source(&self, expression: &str) -> Option<&SourceEntry> {
        self.sources
            .iter()
            .find(|entry| expression.contains(&entry.pattern))
    }

    pub fn match_sink(&self, expression: &str) -> Option<&SinkEntry> {
        self.sinks
            .iter()
            .find(|entry| expression.contains(&entry.pattern))
    }

    pub fn match_sanitizer(&self, expression: &str) -> Option<&SanitizerEntry> {
        self.sanitizers
            .iter()
            .find(|entry| expression.contains(&entry.pattern))
    }

    pub fn match_propagator(&self, expression: &str) -> Option<&PropagatorEntry> {
        self.propagators
            .iter()
            .find(|entry| expression.contains(&entry.pattern))
    }
}

/// Parsed functional dependence of a propagator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgFlow {
    ArgToReturn(Option<usize>), // None = any argument
    ArgToArg(usize, usize),
}

pub fn parse_arg_flow(spec: &str) -> Result<ArgFlow, TaintError> {
    let (from, to) = spec
        .split_once("->")
        .ok_or_else(|| TaintError::InvalidArgFlow {
            spec: spec.to_string(),
            message: "expected '<from>-><to>'".to_string(),
        })?;

    let from_index = match from.trim() {
        "*" => None,
        index => Some(index.parse::<usize>().map_err(|e| TaintError::InvalidArgFlow {
            spec: spec.to_string(),
            message: e.to_string(),
        })?),
    };

    match to.trim() {
        "return" => Ok(ArgFlow::ArgToReturn(from_index)),
        index => {
            let to_index = index.parse::<usize>().map_err(|e| TaintError::InvalidArgFlow {
                spec: spec.to_string(),
                message: e.to_string(),
            })?;
            let from_index = from_index.ok_or_else(|| TaintError::InvalidArgFlow {
                spec: spec.to_string(),
                message: "arg->arg flows need a concrete source index".to_string(),
            })?;
            Ok(ArgFlow::ArgToArg(from_index, to_index))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_parses_and_matches() {
        let registry = TaintRegistry::builtin();
        assert!(registry.match_source("req.query.id").is_some());
        assert_eq!(registry.match_sink("db.query").map(|s| s.cwe), Some(89));
        assert!(registry.match_sanitizer("escapeHtml").is_some());
    }

    #[test]
    fn sanitizers_are_cwe_scoped() {
        let registry = TaintRegistry::builtin();
        let sql_escape = registry.match_sanitizer("escapeSql").unwrap();
        assert!(sql_escape.clears_cwes.contains(&89));
        assert!(!sql_escape.clears_cwes.contains(&79));
    }

    #[test]
    fn arg_flow_forms() {
        assert_eq!(
            parse_arg_flow("0->return").unwrap(),
            ArgFlow::ArgToReturn(Some(0))
        );
        assert_eq!(parse_arg_flow("*->return").unwrap(), ArgFlow::ArgToReturn(None));
        assert_eq!(parse_arg_flow("1->2").unwrap(), ArgFlow::ArgToArg(1, 2));
        assert!(parse_arg_flow("nonsense").is_err());
        assert!(parse_arg_flow("*->2").is_err());
    }

    #[test]
    fn project_entries_extend_builtin() {
        let extra = r#"
[[sinks]]
framework = "custom"
match = "ledger.rawSql"
cwe = 89
"#;
        let mut registry = TaintRegistry::builtin();
        let parsed = TaintRegistry::from_str(extra).unwrap();
        registry.sinks.extend(parsed.sinks);
        assert!(registry.match_sink("ledger.rawSql").is_some());
    }
}
