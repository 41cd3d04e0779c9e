//! Parser errors. Grammar-level syntax errors are not errors here - those
//! are preserved as error ranges inside a partial parse result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported language tag: {tag}")]
    UnsupportedLanguage { tag: String },

    #[error("failed to load grammar for {language}: {message}")]
    GrammarLoadFailed { language: String, message: String },

    #[error("tree-sitter returned no tree for {file}")]
    NoTree { file: String },

    #[error("parser pool exhausted and checkout timed out")]
    PoolExhausted,

    #[error("query compilation failed for {language}: {message}")]
    QueryCompilationFailed { language: String, message: String },
}
