//! PHP node-kind tables.

use crate::gast::GastKind;
use crate::parsers::types::ClassKind;
use crate::scanner::Language;

use super::{shared_normalize, LanguageSpec};

pub static SPEC: LanguageSpec = LanguageSpec {
    language: Language::Php,
    function_kinds: &["function_definition"],
    method_kinds: &["method_declaration"],
    class_kinds: &[
        ("class_declaration", ClassKind::Class),
        ("interface_declaration", ClassKind::Interface),
        ("trait_declaration", ClassKind::Trait),
        ("enum_declaration", ClassKind::Enum),
    ],
    import_kinds: &["namespace_use_declaration"],
    export_kinds: &[],
    call_kinds: &[
        "function_call_expression",
        "member_call_expression",
        "scoped_call_expression",
        "object_creation_expression",
    ],
    decorator_kinds: &["attribute_list"],
    string_kinds: &["string", "encapsed_string"],
    comment_kinds: &["comment"],
    doc_markers: &["/**"],
    normalize,
};

fn normalize(kind: &str) -> GastKind {
    match kind {
        "function_definition" => GastKind::Function,
        "method_declaration" => GastKind::Method,
        "class_declaration" => GastKind::Class,
        "interface_declaration" => GastKind::Interface,
        "trait_declaration" => GastKind::Interface,
        "enum_declaration" => GastKind::Enum,
        "namespace_use_declaration" => GastKind::Import,
        "function_call_expression" => GastKind::Call,
        "member_call_expression" | "scoped_call_expression" => GastKind::MethodCall,
        "object_creation_expression" => GastKind::New,
        "attribute_list" => GastKind::DecoratorApp,
        "property_declaration" => GastKind::Property,
        other => shared_normalize(other).unwrap_or_else(|| GastKind::Other(other.to_string())),
    }
}
