//! Six ranked call-resolution strategies; first match wins and its name is
//! recorded on the edge.

use drift_core::types::collections::FxHashMap;

use crate::parsers::types::CallSite;
use crate::scanner::Language;

use super::index::{FunctionKey, ResolutionSnapshot};

/// Strategy that produced an edge, in descending confidence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    SameFile,
    MethodCall,
    DiInjection,
    ImportBased,
    ExportBased,
    Fuzzy,
}

impl Resolution {
    pub fn confidence(&self) -> f64 {
        match self {
            Self::SameFile => 0.95,
            Self::MethodCall => 0.90,
            Self::DiInjection => 0.80,
            Self::ImportBased => 0.75,
            Self::ExportBased => 0.60,
            // Capped below every ranked strategy.
            Self::Fuzzy => 0.40,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SameFile => "same_file",
            Self::MethodCall => "method_call",
            Self::DiInjection => "di_injection",
            Self::ImportBased => "import_based",
            Self::ExportBased => "export_based",
            Self::Fuzzy => "fuzzy",
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved call site.
#[derive(Debug, Clone)]
pub struct ResolvedCall {
    pub callee: FunctionKey,
    pub strategy: Resolution,
}

/// Ubiquitous names that fuzzy matching must never resolve; the false
/// positive rate on these swamps any signal.
const FUZZY_BLOCKLIST: &[&str] = &[
    "get", "set", "run", "init", "new", "open", "close", "read", "write", "create",
    "update", "delete", "find", "add", "remove", "push", "pop", "map", "filter",
    "send", "call", "apply", "bind", "then", "next", "on", "off", "emit", "log",
    "parse", "format", "render", "handle", "process", "execute", "start", "stop",
    "load", "save", "reset", "clear", "test", "check", "main", "build", "make",
];

impl ResolutionSnapshot {
    /// Resolve one call site. Strategies run in rank order; the first hit
    /// wins. `fuzzy_threshold` gates the last-resort strategy.
    pub fn resolve(
        &self,
        call: &CallSite,
        caller_file: &str,
        fuzzy_threshold: f64,
    ) -> Option<ResolvedCall> {
        let language = self.language_of(caller_file);

        if let Some(callee) = self.same_file(call, caller_file) {
            return Some(ResolvedCall {
                callee,
                strategy: Resolution::SameFile,
            });
        }
        if let Some(callee) = self.method_call(call, caller_file) {
            return Some(ResolvedCall {
                callee,
                strategy: Resolution::MethodCall,
            });
        }
        if let Some(callee) = self.di_injection(call, caller_file) {
            return Some(ResolvedCall {
                callee,
                strategy: Resolution::DiInjection,
            });
        }
        if let Some(callee) = self.import_based(call, caller_file) {
            return Some(ResolvedCall {
                callee,
                strategy: Resolution::ImportBased,
            });
        }
        if let Some(callee) = self.export_based(call, caller_file, language) {
            return Some(ResolvedCall {
                callee,
                strategy: Resolution::ExportBased,
            });
        }
        if let Some(callee) = self.fuzzy(call, language, fuzzy_threshold) {
            return Some(ResolvedCall {
                callee,
                strategy: Resolution::Fuzzy,
            });
        }
        None
    }

    fn named(&self, name: &str) -> Option<&Vec<FunctionKey>> {
        self.by_name.get(&self.symbol(name)?)
    }

    /// 1. A definition in the caller's own file shadows every import.
    fn same_file(&self, call: &CallSite, caller_file: &str) -> Option<FunctionKey> {
        self.named(&call.name)?
            .iter()
            .find(|key| key.file == caller_file)
            .cloned()
    }

    /// 2. Receiver type annotation names the class: `repo.find()` with
    /// `repo: UserRepository` resolves to `UserRepository.find`.
    fn method_call(&self, call: &CallSite, caller_file: &str) -> Option<FunctionKey> {
        let receiver = call.receiver.as_deref()?;

        // Direct qualified hit first: `UserRepository.find()`.
        let direct = format!("{receiver}.{}", call.name);
        if let Some(id) = self.symbol(&direct) {
            if let Some(key) = self.by_qualified.get(&id) {
                return Some(key.clone());
            }
        }

        let facts = self.facts(caller_file)?;
        let base = receiver.split(['.', ':']).next().unwrap_or(receiver);
        let receiver_type = facts.receiver_types.get(base)?;
        let qualified = format!("{receiver_type}.{}", call.name);
        self.by_qualified.get(&self.symbol(&qualified)?).cloned()
    }

    /// 3. DI-constructed receivers: the receiver's base name matches an
    /// injectable class (by convention `userService` → `UserService`).
    fn di_injection(&self, call: &CallSite, caller_file: &str) -> Option<FunctionKey> {
        let receiver = call.receiver.as_deref()?;
        let facts = self.facts(caller_file)?;
        let base = receiver.split(['.', ':']).next().unwrap_or(receiver);

        let candidate = facts
            .injectables
            .iter()
            .find(|class| class.eq_ignore_ascii_case(base) || lower_first(class) == base)?;
        let qualified = format!("{candidate}.{}", call.name);
        self.by_qualified.get(&self.symbol(&qualified)?).cloned()
    }

    /// 4. The callee was imported: follow the import to its module's
    /// definition, honoring aliases.
    fn import_based(&self, call: &CallSite, caller_file: &str) -> Option<FunctionKey> {
        for import in self.imports_of(caller_file) {
            for imported in &import.names {
                let visible = imported.alias.as_deref().unwrap_or(&imported.name);
                if visible != call.name {
                    continue;
                }
                let Some(candidates) = self.named(&imported.name) else {
                    continue;
                };
                if let Some(key) = best_for_module(candidates, &import.module) {
                    return Some(key);
                }
                return candidates.first().cloned();
            }
        }
        None
    }

    /// 5. Some module exports the name. Disambiguate by import linkage,
    /// then language family, then directory proximity.
    fn export_based(
        &self,
        call: &CallSite,
        caller_file: &str,
        language: Option<Language>,
    ) -> Option<FunctionKey> {
        let candidates = self.exports.get(&self.symbol(&call.name)?)?;
        if candidates.len() == 1 {
            return candidates.first().cloned();
        }

        for import in self.imports_of(caller_file) {
            if let Some(key) = best_for_module(candidates, &import.module) {
                return Some(key);
            }
        }

        if let Some(language) = language {
            let same_family: Vec<&FunctionKey> = candidates
                .iter()
                .filter(|key| {
                    self.language_of(&key.file)
                        .map(|l| l.family() == language.family())
                        .unwrap_or(false)
                })
                .collect();
            if same_family.len() == 1 {
                return Some(same_family[0].clone());
            }
        }

        candidates
            .iter()
            .max_by_key(|key| common_prefix(&key.file, caller_file))
            .cloned()
    }

    /// 6. Fuzzy: unique near-match above the similarity threshold, scoped
    /// to the caller's language family, never for blocklisted names.
    fn fuzzy(
        &self,
        call: &CallSite,
        language: Option<Language>,
        threshold: f64,
    ) -> Option<FunctionKey> {
        if FUZZY_BLOCKLIST
            .iter()
            .any(|blocked| call.name.eq_ignore_ascii_case(blocked))
        {
            return None;
        }

        let mut best: Option<(f64, &FunctionKey)> = None;
        let mut hits = 0usize;
        for (&id, keys) in &self.by_name {
            let name = self.symbols.resolve(&id.key());
            let score = name_similarity(&call.name, name);
            if score < threshold {
                continue;
            }
            for key in keys {
                if let (Some(language), Some(key_lang)) =
                    (language, self.language_of(&key.file))
                {
                    if key_lang.family() != language.family() {
                        continue;
                    }
                }
                hits += 1;
                if best.map(|(s, _)| score > s).unwrap_or(true) {
                    best = Some((score, key));
                }
            }
        }

        // Ambiguous fuzzy matches are worse than none.
        if hits == 1 {
            best.map(|(_, key)| key.clone())
        } else {
            None
        }
    }
}

/// Normalized similarity in [0, 1] from Levenshtein distance.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (levenshtein(a, b) as f64 / max_len as f64)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

fn best_for_module(candidates: &[FunctionKey], module: &str) -> Option<FunctionKey> {
    let normalized = normalize_module(module);
    if normalized.is_empty() {
        return None;
    }
    candidates
        .iter()
        .find(|key| {
            let file = key.file.to_lowercase();
            let stem = file.rsplit('/').next().unwrap_or(&file);
            file.contains(&normalized)
                || normalized
                    .rsplit('/')
                    .next()
                    .map(|last| stem.starts_with(last))
                    .unwrap_or(false)
        })
        .cloned()
}

fn normalize_module(module: &str) -> String {
    let mut m = module.trim();
    while let Some(stripped) = m.strip_prefix("./").or_else(|| m.strip_prefix("../")) {
        m = stripped;
    }
    let mut out = m.to_lowercase();
    for ext in [".ts", ".tsx", ".js", ".jsx", ".py", ".rb", ".php"] {
        if let Some(stripped) = out.strip_suffix(ext) {
            out = stripped.to_string();
            break;
        }
    }
    out
}

fn common_prefix(a: &str, b: &str) -> usize {
    a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count()
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Per-strategy and per-language resolution bookkeeping surfaced in scan
/// diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ResolutionDiagnostics {
    pub total: usize,
    pub resolved: usize,
    pub by_strategy: FxHashMap<&'static str, usize>,
    pub by_language: FxHashMap<String, (usize, usize)>,
}

impl ResolutionDiagnostics {
    pub fn record(&mut self, language: Option<Language>, strategy: Option<Resolution>) {
        self.total += 1;
        let lang_name = language.map(|l| l.name().to_string()).unwrap_or_default();
        let entry = self.by_language.entry(lang_name).or_insert((0, 0));
        entry.1 += 1;
        if let Some(strategy) = strategy {
            self.resolved += 1;
            *self.by_strategy.entry(strategy.name()).or_insert(0) += 1;
            entry.0 += 1;
        }
    }

    pub fn resolution_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.resolved as f64 / self.total as f64
        }
    }

    /// Languages resolving under 30% of their call sites.
    pub fn low_resolution_languages(&self) -> Vec<String> {
        self.by_language
            .iter()
            .filter(|(_, (resolved, total))| {
                *total > 0 && (*resolved as f64 / *total as f64) < 0.30
            })
            .map(|(lang, _)| lang.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::ParseResult;
    use crate::resolution::ResolutionIndex;
    use crate::scanner::Language;

    fn parse_result(file: &str, functions: &[(&str, &str, bool)]) -> ParseResult {
        use crate::parsers::types::FunctionInfo;
        use smallvec::SmallVec;

        let mut result = ParseResult::empty(file.to_string(), Language::TypeScript, 1);
        for (name, qualified, exported) in functions {
            result.functions.push(FunctionInfo {
                name: name.to_string(),
                qualified_name: qualified.to_string(),
                signature: format!("function {name}()"),
                body_hash: 1,
                start_line: 1,
                end_line: 5,
                parameters: SmallVec::new(),
                return_type: None,
                is_async: false,
                is_exported: *exported,
                is_method: name != qualified,
                decorators: Vec::new(),
                range: Default::default(),
            });
        }
        result
    }

    fn call(name: &str, receiver: Option<&str>) -> CallSite {
        CallSite {
            name: name.to_string(),
            receiver: receiver.map(String::from),
            line: 10,
            column: 0,
            argument_count: 0,
            caller: None,
        }
    }

    fn import(module: &str, name: &str) -> crate::parsers::types::ImportInfo {
        crate::parsers::types::ImportInfo {
            raw: format!("import {{ {name} }} from '{module}'"),
            module: module.to_string(),
            names: smallvec::smallvec![crate::parsers::types::ImportedName {
                name: name.to_string(),
                alias: None,
            }],
            is_type_only: false,
            line: 0,
        }
    }

    #[test]
    fn same_file_beats_import() {
        let index = ResolutionIndex::new();
        // foo defined locally AND exported from another module.
        let mut local = parse_result("src/a.ts", &[("foo", "foo", false)]);
        local.imports.push(import("./m", "foo"));
        index.add_file(&local);
        index.add_file(&parse_result("src/m.ts", &[("foo", "foo", true)]));

        let snapshot = index.seal();
        let resolved = snapshot.resolve(&call("foo", None), "src/a.ts", 0.85).unwrap();
        assert_eq!(resolved.strategy, Resolution::SameFile);
        assert_eq!(resolved.callee.file, "src/a.ts");
        assert!(resolved.strategy.confidence() >= 0.95);
    }

    #[test]
    fn import_resolves_to_source_module() {
        let index = ResolutionIndex::new();
        let mut caller = parse_result("src/a.ts", &[]);
        caller.imports.push(import("./util", "helper"));
        index.add_file(&caller);
        index.add_file(&parse_result("src/util.ts", &[("helper", "helper", true)]));
        index.add_file(&parse_result("src/other.ts", &[("helper", "helper", false)]));

        let snapshot = index.seal();
        let resolved = snapshot
            .resolve(&call("helper", None), "src/a.ts", 0.85)
            .unwrap();
        assert_eq!(resolved.strategy, Resolution::ImportBased);
        assert_eq!(resolved.callee.file, "src/util.ts");
    }

    #[test]
    fn method_call_via_receiver_type() {
        use crate::parsers::types::ParameterInfo;

        let index = ResolutionIndex::new();
        let mut caller = parse_result("src/svc.ts", &[("handle", "handle", false)]);
        caller.functions[0]
            .parameters
            .push(ParameterInfo {
                name: "repo".to_string(),
                type_annotation: Some("UserRepository".to_string()),
            });
        index.add_file(&caller);
        index.add_file(&parse_result(
            "src/repo.ts",
            &[("findAll", "UserRepository.findAll", true)],
        ));

        let snapshot = index.seal();
        let resolved = snapshot
            .resolve(&call("findAll", Some("repo")), "src/svc.ts", 0.85)
            .unwrap();
        assert_eq!(resolved.strategy, Resolution::MethodCall);
        assert_eq!(resolved.callee.qualified, "UserRepository.findAll");
    }

    #[test]
    fn export_based_when_not_imported() {
        let index = ResolutionIndex::new();
        index.add_file(&parse_result("src/a.ts", &[]));
        index.add_file(&parse_result(
            "src/service.ts",
            &[("computeTotals", "computeTotals", true)],
        ));

        let snapshot = index.seal();
        let resolved = snapshot
            .resolve(&call("computeTotals", None), "src/a.ts", 0.85)
            .unwrap();
        assert_eq!(resolved.strategy, Resolution::ExportBased);
    }

    #[test]
    fn fuzzy_needs_threshold_and_uniqueness() {
        let index = ResolutionIndex::new();
        index.add_file(&parse_result(
            "src/x.ts",
            &[("computeInvoiceTotal", "computeInvoiceTotal", false)],
        ));
        index.add_file(&parse_result("src/y.ts", &[]));
        let snapshot = index.seal();

        // One-character difference: above 0.85, unique → Fuzzy.
        let resolved = snapshot
            .resolve(&call("computeInvoiceTotals", None), "src/y.ts", 0.85)
            .unwrap();
        assert_eq!(resolved.strategy, Resolution::Fuzzy);
        // Fuzzy confidence never exceeds the ranked strategies.
        assert!(resolved.strategy.confidence() < Resolution::ExportBased.confidence());

        // Dissimilar name: no match.
        assert!(snapshot
            .resolve(&call("renderHeader", None), "src/y.ts", 0.85)
            .is_none());
    }

    #[test]
    fn blocklisted_names_never_fuzzy() {
        let index = ResolutionIndex::new();
        index.add_file(&parse_result("src/x.ts", &[("get", "get", false)]));
        index.add_file(&parse_result("src/y.ts", &[]));
        let snapshot = index.seal();
        // "get" exists, but blocked names only resolve same-file/import.
        assert!(snapshot.resolve(&call("get", None), "src/y.ts", 0.85).is_none());
    }

    #[test]
    fn similarity_metric_sane() {
        assert!(name_similarity("abc", "abc") == 1.0);
        assert!(name_similarity("getUser", "getUsers") > 0.85);
        assert!(name_similarity("getUser", "deleteOrder") < 0.5);
    }
}
