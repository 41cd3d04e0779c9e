//! Java node-kind tables.

use crate::gast::GastKind;
use crate::parsers::types::ClassKind;
use crate::scanner::Language;

use super::{shared_normalize, LanguageSpec};

pub static SPEC: LanguageSpec = LanguageSpec {
    language: Language::Java,
    function_kinds: &[],
    method_kinds: &["method_declaration", "constructor_declaration"],
    class_kinds: &[
        ("class_declaration", ClassKind::Class),
        ("interface_declaration", ClassKind::Interface),
        ("enum_declaration", ClassKind::Enum),
        ("record_declaration", ClassKind::Class),
    ],
    import_kinds: &["import_declaration"],
    export_kinds: &[],
    call_kinds: &["method_invocation", "object_creation_expression"],
    decorator_kinds: &["marker_annotation", "annotation"],
    string_kinds: &["string_literal"],
    comment_kinds: &["line_comment", "block_comment"],
    doc_markers: &["/**"],
    normalize,
};

fn normalize(kind: &str) -> GastKind {
    match kind {
        "method_declaration" => GastKind::Method,
        "constructor_declaration" => GastKind::Constructor,
        "class_declaration" | "record_declaration" => GastKind::Class,
        "interface_declaration" => GastKind::Interface,
        "enum_declaration" => GastKind::Enum,
        "import_declaration" => GastKind::Import,
        "method_invocation" => GastKind::MethodCall,
        "object_creation_expression" => GastKind::New,
        "marker_annotation" | "annotation" => GastKind::DecoratorApp,
        "local_variable_declaration" | "field_declaration" => GastKind::VariableDecl,
        "lambda_expression" => GastKind::Lambda,
        other => shared_normalize(other).unwrap_or_else(|| GastKind::Other(other.to_string())),
    }
}
