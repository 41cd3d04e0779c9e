//! Kotlin node-kind tables.

use crate::gast::GastKind;
use crate::parsers::types::ClassKind;
use crate::scanner::Language;

use super::{shared_normalize, LanguageSpec};

pub static SPEC: LanguageSpec = LanguageSpec {
    language: Language::Kotlin,
    function_kinds: &["function_declaration"],
    method_kinds: &["function_declaration"],
    class_kinds: &[
        ("class_declaration", ClassKind::Class),
        ("object_declaration", ClassKind::Class),
    ],
    import_kinds: &["import_header"],
    export_kinds: &[],
    call_kinds: &["call_expression"],
    decorator_kinds: &["annotation"],
    string_kinds: &["string_literal"],
    comment_kinds: &["line_comment", "multiline_comment"],
    doc_markers: &["/**"],
    normalize,
};

fn normalize(kind: &str) -> GastKind {
    match kind {
        "function_declaration" => GastKind::Function,
        "class_declaration" | "object_declaration" => GastKind::Class,
        "import_header" => GastKind::Import,
        "call_expression" => GastKind::Call,
        "annotation" => GastKind::DecoratorApp,
        "property_declaration" => GastKind::VariableDecl,
        "when_expression" => GastKind::Switch,
        "multiline_comment" => GastKind::Comment,
        other => shared_normalize(other).unwrap_or_else(|| GastKind::Other(other.to_string())),
    }
}
