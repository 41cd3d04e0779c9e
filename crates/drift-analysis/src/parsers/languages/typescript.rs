//! TypeScript (and TSX) node-kind tables.

use crate::gast::GastKind;
use crate::parsers::types::ClassKind;
use crate::scanner::Language;

use super::{shared_normalize, LanguageSpec};

pub static SPEC: LanguageSpec = LanguageSpec {
    language: Language::TypeScript,
    function_kinds: &["function_declaration", "generator_function_declaration"],
    method_kinds: &["method_definition"],
    class_kinds: &[
        ("class_declaration", ClassKind::Class),
        ("abstract_class_declaration", ClassKind::Class),
        ("interface_declaration", ClassKind::Interface),
        ("enum_declaration", ClassKind::Enum),
    ],
    import_kinds: &["import_statement"],
    export_kinds: &["export_statement"],
    call_kinds: &["call_expression", "new_expression"],
    decorator_kinds: &["decorator"],
    string_kinds: &["string", "template_string"],
    comment_kinds: &["comment"],
    doc_markers: &["/**", "///"],
    normalize,
};

fn normalize(kind: &str) -> GastKind {
    match kind {
        "function_declaration" | "generator_function_declaration" | "function_expression" => {
            GastKind::Function
        }
        "method_definition" => GastKind::Method,
        "class_declaration" | "abstract_class_declaration" => GastKind::Class,
        "interface_declaration" => GastKind::Interface,
        "enum_declaration" => GastKind::Enum,
        "type_alias_declaration" => GastKind::TypeAlias,
        "import_statement" => GastKind::Import,
        "export_statement" => GastKind::Export,
        "call_expression" => GastKind::Call,
        "decorator" => GastKind::DecoratorApp,
        "lexical_declaration" | "variable_declaration" => GastKind::VariableDecl,
        "public_field_definition" | "property_signature" => GastKind::Property,
        other => shared_normalize(other).unwrap_or_else(|| GastKind::Other(other.to_string())),
    }
}
