//! Parser manager: grammars loaded once, parsers pooled, results cached by
//! `(language, content_hash)`.

mod cache;
mod extract;
pub mod languages;
mod pool;
pub mod types;

use std::sync::Arc;

use drift_core::errors::ParseError;
use drift_storage::{queries::parse_cache, BatchCommand, BatchSender, Store};

use crate::scanner::Language;

pub use cache::ParseCache;
pub use pool::ParserPool;
pub use types::ParseResult;

pub struct ParserManager {
    pool: ParserPool,
    cache: Arc<ParseCache>,
    /// Durable cache lookups; absent in cache-less (test) mode.
    store: Option<Arc<Store>>,
}

impl ParserManager {
    pub fn new(pool_size: usize, store: Option<Arc<Store>>) -> Self {
        Self {
            pool: ParserPool::new(pool_size),
            cache: Arc::new(ParseCache::with_default_capacity()),
            store,
        }
    }

    /// Parse one file, consulting the memory cache then the durable table.
    /// A hit skips parsing entirely; the returned result is bit-identical
    /// to the original parse of the same content.
    ///
    /// `sink` receives the durable-cache write for fresh parses.
    pub fn parse(
        &self,
        file: &str,
        source: &[u8],
        language: Language,
        content_hash: u64,
        sink: Option<&BatchSender>,
    ) -> Result<ParseResult, ParseError> {
        if let Some(cached) = self.cache.get(language, content_hash) {
            return Ok(cached);
        }

        if let Some(store) = &self.store {
            if let Ok(Some(json)) = store
                .with_reader(|conn| parse_cache::get(conn, language.name(), content_hash))
            {
                if let Ok(result) = serde_json::from_str::<ParseResult>(&json) {
                    self.cache.put(result.clone());
                    return Ok(result);
                }
            }
        }

        let result = self.parse_uncached(file, source, language, content_hash)?;
        self.cache.put(result.clone());

        if let Some(sink) = sink {
            if let Ok(json) = serde_json::to_string(&result) {
                let _ = sink.send(BatchCommand::CacheParseResult {
                    language: language.name().to_string(),
                    content_hash,
                    result_json: json,
                });
            }
        }
        Ok(result)
    }

    fn parse_uncached(
        &self,
        file: &str,
        source: &[u8],
        language: Language,
        content_hash: u64,
    ) -> Result<ParseResult, ParseError> {
        let extension = file.rsplit('.').next();
        let grammar = languages::grammar_for(language, extension);
        let spec = languages::spec_for(language);

        let mut guard = self.pool.checkout(&grammar)?;
        let tree = guard.parse(source).ok_or_else(|| ParseError::NoTree {
            file: file.to_string(),
        })?;

        Ok(extract::extract(
            &tree,
            source,
            file,
            language,
            content_hash,
            spec,
        ))
    }

    /// Parse and normalize in one step, for callers that need the GAST.
    pub fn parse_with_gast(
        &self,
        file: &str,
        source: &[u8],
        language: Language,
        content_hash: u64,
        sink: Option<&BatchSender>,
    ) -> Result<(ParseResult, crate::gast::GastNode), ParseError> {
        let result = self.parse(file, source, language, content_hash, sink)?;

        let extension = file.rsplit('.').next();
        let grammar = languages::grammar_for(language, extension);
        let spec = languages::spec_for(language);
        let mut guard = self.pool.checkout(&grammar)?;
        let tree = guard.parse(source).ok_or_else(|| ParseError::NoTree {
            file: file.to_string(),
        })?;
        let gast = crate::gast::normalize_tree(&tree, source, spec);
        Ok((result, gast))
    }

    pub fn cache_hit_rate(&self) -> f64 {
        self.cache.hit_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ParserManager {
        ParserManager::new(2, None)
    }

    #[test]
    fn typescript_functions_and_calls() {
        let source = br#"
import { db } from './db';

export async function getUser(id: string) {
    return db.query('SELECT * FROM users WHERE id = ?', [id]);
}

function helper() {
    getUser('42');
}
"#;
        let result = manager()
            .parse("src/user.ts", source, Language::TypeScript, 1, None)
            .unwrap();

        let names: Vec<&str> = result.functions.iter().map(|f| f.name.as_str()).collect();
        assert!(names.contains(&"getUser"));
        assert!(names.contains(&"helper"));

        let get_user = result.functions.iter().find(|f| f.name == "getUser").unwrap();
        assert!(get_user.is_async);
        assert!(get_user.is_exported);

        assert!(result
            .call_sites
            .iter()
            .any(|c| c.name == "query" && c.receiver.as_deref() == Some("db")));
        assert!(result
            .call_sites
            .iter()
            .any(|c| c.name == "getUser" && c.caller.as_deref() == Some("helper")));

        assert_eq!(result.imports.len(), 1);
        assert_eq!(result.imports[0].module, "./db");
    }

    #[test]
    fn python_classes_and_methods() {
        let source = br#"
class UserService:
    def find(self, user_id):
        return self.repo.get(user_id)

def main():
    svc = UserService()
"#;
        let result = manager()
            .parse("svc.py", source, Language::Python, 2, None)
            .unwrap();

        assert!(result.classes.iter().any(|c| c.name == "UserService"));
        let find = result
            .functions
            .iter()
            .find(|f| f.name == "find")
            .expect("method extracted");
        assert_eq!(find.qualified_name, "UserService.find");
        assert!(find.is_method);
    }

    #[test]
    fn parse_errors_preserve_partial_result() {
        // Unclosed brace: the file is broken but the first function parses.
        let source = b"function ok() { return 1; }\nfunction broken( {\n";
        let result = manager()
            .parse("broken.js", source, Language::JavaScript, 3, None)
            .unwrap();
        assert!(result.has_errors);
        assert!(result.functions.iter().any(|f| f.name == "ok"));
    }

    #[test]
    fn repeat_parse_hits_cache_bit_identical() {
        let manager = manager();
        let source = b"export function once() { return 1; }\n";
        let first = manager
            .parse("a.ts", source, Language::TypeScript, 9, None)
            .unwrap();
        let second = manager
            .parse("a.ts", source, Language::TypeScript, 9, None)
            .unwrap();
        assert_eq!(first, second);
        assert!(manager.cache_hit_rate() > 0.0);
    }

    #[test]
    fn all_ten_grammars_load() {
        let manager = manager();
        let samples: &[(Language, &str, &[u8])] = &[
            (Language::TypeScript, "a.ts", b"const a = 1;"),
            (Language::JavaScript, "a.js", b"const a = 1;"),
            (Language::Python, "a.py", b"x = 1"),
            (Language::Java, "A.java", b"class A { void m() {} }"),
            (Language::CSharp, "A.cs", b"class A { void M() {} }"),
            (Language::Go, "a.go", b"package a\nfunc F() {}"),
            (Language::Rust, "a.rs", b"pub fn f() {}"),
            (Language::Ruby, "a.rb", b"def f\nend"),
            (Language::Php, "a.php", b"<?php function f() {} ?>"),
            (Language::Kotlin, "a.kt", b"fun f() {}"),
        ];
        for (i, (language, file, source)) in samples.iter().enumerate() {
            let result = manager.parse(file, source, *language, 100 + i as u64, None);
            assert!(result.is_ok(), "{language} failed to parse");
        }
    }
}
