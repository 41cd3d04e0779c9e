//! Rust node-kind tables.

use crate::gast::GastKind;
use crate::parsers::types::ClassKind;
use crate::scanner::Language;

use super::{shared_normalize, LanguageSpec};

pub static SPEC: LanguageSpec = LanguageSpec {
    language: Language::Rust,
    function_kinds: &["function_item"],
    method_kinds: &["function_item"],
    class_kinds: &[
        ("struct_item", ClassKind::Struct),
        ("enum_item", ClassKind::Enum),
        ("trait_item", ClassKind::Trait),
    ],
    import_kinds: &["use_declaration"],
    export_kinds: &[],
    call_kinds: &["call_expression", "macro_invocation"],
    decorator_kinds: &["attribute_item"],
    string_kinds: &["string_literal", "raw_string_literal"],
    comment_kinds: &["line_comment", "block_comment"],
    doc_markers: &["///", "//!"],
    normalize,
};

fn normalize(kind: &str) -> GastKind {
    match kind {
        "function_item" => GastKind::Function,
        "struct_item" => GastKind::Struct,
        "enum_item" => GastKind::Enum,
        "trait_item" => GastKind::Interface,
        "impl_item" => GastKind::Class,
        "type_item" => GastKind::TypeAlias,
        "use_declaration" => GastKind::Import,
        "call_expression" | "macro_invocation" => GastKind::Call,
        "attribute_item" | "inner_attribute_item" => GastKind::DecoratorApp,
        "let_declaration" => GastKind::VariableDecl,
        "match_expression" => GastKind::Switch,
        "try_expression" => GastKind::TryCatch,
        "mod_item" => GastKind::Module,
        other => shared_normalize(other).unwrap_or_else(|| GastKind::Other(other.to_string())),
    }
}
