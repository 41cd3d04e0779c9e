//! The uniform `ParseResult` every language parser produces.
//!
//! This is the one shape downstream systems consume; it also round-trips
//! through JSON for the durable parse cache, so identical content yields a
//! bit-identical cached result.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::scanner::Language;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub file: String,
    pub language: Language,
    pub content_hash: u64,

    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub imports: Vec<ImportInfo>,
    pub exports: Vec<ExportInfo>,
    pub call_sites: Vec<CallSite>,
    pub decorators: Vec<DecoratorInfo>,
    pub string_literals: Vec<StringLiteral>,
    pub doc_comments: Vec<DocComment>,

    pub error_ranges: Vec<Range>,
    pub has_errors: bool,
}

impl ParseResult {
    pub fn empty(file: String, language: Language, content_hash: u64) -> Self {
        Self {
            file,
            language,
            content_hash,
            functions: Vec::new(),
            classes: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            call_sites: Vec::new(),
            decorators: Vec::new(),
            string_literals: Vec::new(),
            doc_comments: Vec::new(),
            error_ranges: Vec::new(),
            has_errors: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    /// `Class.method` for methods, the bare name otherwise.
    pub qualified_name: String,
    pub signature: String,
    pub body_hash: u64,
    pub start_line: u32,
    pub end_line: u32,
    pub parameters: SmallVec<[ParameterInfo; 4]>,
    pub return_type: Option<String>,
    pub is_async: bool,
    pub is_exported: bool,
    pub is_method: bool,
    pub decorators: Vec<String>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    pub type_annotation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub kind: ClassKind,
    pub extends: Option<String>,
    pub implements: SmallVec<[String; 2]>,
    pub methods: Vec<String>,
    pub properties: Vec<PropertyInfo>,
    pub decorators: Vec<String>,
    pub is_exported: bool,
    pub range: Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Class,
    Interface,
    Struct,
    Enum,
    Trait,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    pub type_annotation: Option<String>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportInfo {
    /// The import statement as written.
    pub raw: String,
    /// The module being imported from.
    pub module: String,
    pub names: SmallVec<[ImportedName; 4]>,
    pub is_type_only: bool,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportInfo {
    pub name: Option<String>,
    pub is_default: bool,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSite {
    pub name: String,
    /// Receiver chain (`repo` in `repo.save(...)`, `a.b` in `a.b.c(...)`).
    pub receiver: Option<String>,
    pub line: u32,
    pub column: u32,
    pub argument_count: u8,
    /// Qualified name of the enclosing function, when known.
    pub caller: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoratorInfo {
    pub name: String,
    pub raw: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringLiteral {
    pub value: String,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocComment {
    pub text: String,
    pub line: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Range {
    pub fn from_node(node: &tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_line: start.row as u32,
            start_col: start.column as u32,
            end_line: end.row as u32,
            end_col: end.column as u32,
        }
    }
}
