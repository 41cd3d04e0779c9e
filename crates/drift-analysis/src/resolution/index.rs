//! Index construction: interned symbols, sharded writes during the
//! parallel detect phase, one seal into a read-only snapshot.
//!
//! Symbol and path handles come from the drift-core interners; the sealed
//! snapshot keys its maps by `FunctionId`/`FileId` so lookups hash a small
//! integer instead of a string.

use std::sync::Mutex;

use drift_core::types::collections::FxHashMap;
use drift_core::types::{FileId, FunctionId, InternerSnapshot, PathInterner, SymbolInterner};
use lasso::Key;

use crate::parsers::types::ImportInfo;
use crate::parsers::ParseResult;
use crate::scanner::Language;

const SHARD_COUNT: usize = 16;

/// Identity of a resolvable function: owning file plus qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionKey {
    pub file: String,
    pub qualified: String,
}

impl FunctionKey {
    pub fn new(file: impl Into<String>, qualified: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            qualified: qualified.into(),
        }
    }

    /// The flat `file::qualified` form used as a graph node id.
    pub fn node_id(&self) -> String {
        format!("{}::{}", self.file, self.qualified)
    }
}

#[derive(Default)]
struct Shard {
    /// Bare name → every function carrying it.
    by_name: FxHashMap<FunctionId, Vec<FunctionKey>>,
    /// `Class.method` → defining function.
    by_qualified: FxHashMap<FunctionId, FunctionKey>,
    /// Exported name → exporting functions.
    exports: FxHashMap<FunctionId, Vec<FunctionKey>>,
}

/// Mutable, shard-locked index filled during the parallel per-file phase.
pub struct ResolutionIndex {
    symbols: SymbolInterner,
    paths: PathInterner,
    shards: Vec<Mutex<Shard>>,
    files: Mutex<FxHashMap<FileId, FileFacts>>,
}

#[derive(Default, Clone)]
pub(crate) struct FileFacts {
    pub language: Option<Language>,
    pub imports: Vec<ImportInfo>,
    /// Parameter/property name → annotated type, for receiver resolution.
    pub receiver_types: FxHashMap<String, String>,
    /// Class names flagged injectable by DI annotations.
    pub injectables: Vec<String>,
}

impl ResolutionIndex {
    pub fn new() -> Self {
        Self {
            symbols: SymbolInterner::new(),
            paths: PathInterner::new(),
            shards: (0..SHARD_COUNT)
                .map(|_| Mutex::new(Shard::default()))
                .collect(),
            files: Mutex::new(FxHashMap::default()),
        }
    }

    fn shard_for(&self, id: FunctionId) -> &Mutex<Shard> {
        &self.shards[id.key().into_usize() % SHARD_COUNT]
    }

    /// Ingest one parsed file. Called concurrently from the detect phase.
    pub fn add_file(&self, parse: &ParseResult) {
        for function in &parse.functions {
            let key = FunctionKey::new(&parse.file, &function.qualified_name);
            let name_id = FunctionId::new(self.symbols.intern(&function.name));

            {
                let mut shard = self.shard_for(name_id).lock().unwrap();
                shard.by_name.entry(name_id).or_default().push(key.clone());
                if function.is_exported {
                    shard.exports.entry(name_id).or_default().push(key.clone());
                }
            }

            if function.qualified_name != function.name {
                let qualified_id =
                    FunctionId::new(self.symbols.intern(&function.qualified_name));
                let mut shard = self.shard_for(qualified_id).lock().unwrap();
                shard.by_qualified.insert(qualified_id, key);
            }
        }

        let facts = FileFacts {
            language: Some(parse.language),
            imports: parse.imports.clone(),
            receiver_types: receiver_types_of(parse),
            injectables: injectables_of(parse),
        };
        let file_id = FileId::new(self.paths.intern(&parse.file));
        self.files.lock().unwrap().insert(file_id, facts);
    }

    /// Seal into the immutable snapshot. The interners freeze into
    /// contention-free readers; no mutation is possible after.
    pub fn seal(self) -> ResolutionSnapshot {
        let mut by_name: FxHashMap<FunctionId, Vec<FunctionKey>> = FxHashMap::default();
        let mut by_qualified: FxHashMap<FunctionId, FunctionKey> = FxHashMap::default();
        let mut exports: FxHashMap<FunctionId, Vec<FunctionKey>> = FxHashMap::default();

        for shard in self.shards {
            let shard = shard.into_inner().unwrap();
            for (name, mut keys) in shard.by_name {
                by_name.entry(name).or_default().append(&mut keys);
            }
            for (qualified, key) in shard.by_qualified {
                by_qualified.insert(qualified, key);
            }
            for (name, mut keys) in shard.exports {
                exports.entry(name).or_default().append(&mut keys);
            }
        }

        // Deterministic ordering regardless of insert interleaving.
        for keys in by_name.values_mut() {
            keys.sort_by(|a, b| a.node_id().cmp(&b.node_id()));
        }
        for keys in exports.values_mut() {
            keys.sort_by(|a, b| a.node_id().cmp(&b.node_id()));
        }

        let files = self.files.into_inner().unwrap();

        ResolutionSnapshot {
            by_name,
            by_qualified,
            exports,
            files,
            symbols: self.symbols.freeze(),
            paths: self.paths.freeze(),
        }
    }
}

impl Default for ResolutionIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// The sealed, read-only index the strategies run against.
pub struct ResolutionSnapshot {
    pub(crate) by_name: FxHashMap<FunctionId, Vec<FunctionKey>>,
    pub(crate) by_qualified: FxHashMap<FunctionId, FunctionKey>,
    pub(crate) exports: FxHashMap<FunctionId, Vec<FunctionKey>>,
    pub(crate) files: FxHashMap<FileId, FileFacts>,
    pub(crate) symbols: InternerSnapshot,
    paths: InternerSnapshot,
}

impl ResolutionSnapshot {
    pub fn function_count(&self) -> usize {
        self.by_name.values().map(Vec::len).sum()
    }

    /// Symbol handle for a name, if it was ever indexed.
    pub(crate) fn symbol(&self, name: &str) -> Option<FunctionId> {
        self.symbols.get(name).map(FunctionId::new)
    }

    pub(crate) fn file_id(&self, file: &str) -> Option<FileId> {
        // The reader resolves only already-interned paths; normalize the
        // same way the interner did.
        let normalized = file.replace('\\', "/");
        self.paths.get(&normalized).map(FileId::new)
    }

    pub(crate) fn facts(&self, file: &str) -> Option<&FileFacts> {
        self.files.get(&self.file_id(file)?)
    }

    pub fn imports_of(&self, file: &str) -> &[ImportInfo] {
        self.facts(file)
            .map(|f| f.imports.as_slice())
            .unwrap_or(&[])
    }

    pub fn language_of(&self, file: &str) -> Option<Language> {
        self.facts(file).and_then(|f| f.language)
    }
}

/// Type annotations usable as receiver hints: `repo: UserRepository` means
/// `repo.find()` resolves against `UserRepository.find`.
fn receiver_types_of(parse: &ParseResult) -> FxHashMap<String, String> {
    let mut map = FxHashMap::default();
    for function in &parse.functions {
        for param in &function.parameters {
            if let Some(ty) = &param.type_annotation {
                let ty = ty.trim_start_matches(':').trim();
                if !ty.is_empty() {
                    map.insert(param.name.clone(), ty.to_string());
                }
            }
        }
    }
    for class in &parse.classes {
        for property in &class.properties {
            if let Some(ty) = &property.type_annotation {
                let ty = ty.trim_start_matches(':').trim();
                if !ty.is_empty() {
                    map.insert(property.name.clone(), ty.to_string());
                }
            }
        }
    }
    map
}

const DI_MARKERS: &[&str] = &["Inject", "Injectable", "Autowired", "inject", "Provide"];

fn injectables_of(parse: &ParseResult) -> Vec<String> {
    let mut names = Vec::new();
    for class in &parse.classes {
        if class
            .decorators
            .iter()
            .any(|d| DI_MARKERS.iter().any(|m| d.contains(m)))
        {
            names.push(class.name.clone());
        }
    }
    names
}
