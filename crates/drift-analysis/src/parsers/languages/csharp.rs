//! C# node-kind tables.

use crate::gast::GastKind;
use crate::parsers::types::ClassKind;
use crate::scanner::Language;

use super::{shared_normalize, LanguageSpec};

pub static SPEC: LanguageSpec = LanguageSpec {
    language: Language::CSharp,
    function_kinds: &["local_function_statement"],
    method_kinds: &["method_declaration", "constructor_declaration"],
    class_kinds: &[
        ("class_declaration", ClassKind::Class),
        ("interface_declaration", ClassKind::Interface),
        ("struct_declaration", ClassKind::Struct),
        ("enum_declaration", ClassKind::Enum),
        ("record_declaration", ClassKind::Class),
    ],
    import_kinds: &["using_directive"],
    export_kinds: &[],
    call_kinds: &["invocation_expression", "object_creation_expression"],
    decorator_kinds: &["attribute_list"],
    string_kinds: &["string_literal", "interpolated_string_expression"],
    comment_kinds: &["comment"],
    doc_markers: &["///"],
    normalize,
};

fn normalize(kind: &str) -> GastKind {
    match kind {
        "method_declaration" | "local_function_statement" => GastKind::Method,
        "constructor_declaration" => GastKind::Constructor,
        "class_declaration" | "record_declaration" => GastKind::Class,
        "interface_declaration" => GastKind::Interface,
        "struct_declaration" => GastKind::Struct,
        "enum_declaration" => GastKind::Enum,
        "using_directive" => GastKind::Import,
        "invocation_expression" => GastKind::Call,
        "object_creation_expression" => GastKind::New,
        "attribute_list" => GastKind::DecoratorApp,
        "variable_declaration" | "field_declaration" => GastKind::VariableDecl,
        "property_declaration" => GastKind::Property,
        other => shared_normalize(other).unwrap_or_else(|| GastKind::Other(other.to_string())),
    }
}
