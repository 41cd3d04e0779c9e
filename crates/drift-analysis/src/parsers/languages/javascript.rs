//! JavaScript node-kind tables. Shares most of the TypeScript surface.

use crate::gast::GastKind;
use crate::parsers::types::ClassKind;
use crate::scanner::Language;

use super::{shared_normalize, LanguageSpec};

pub static SPEC: LanguageSpec = LanguageSpec {
    language: Language::JavaScript,
    function_kinds: &["function_declaration", "generator_function_declaration"],
    method_kinds: &["method_definition"],
    class_kinds: &[("class_declaration", ClassKind::Class)],
    import_kinds: &["import_statement"],
    export_kinds: &["export_statement"],
    call_kinds: &["call_expression", "new_expression"],
    decorator_kinds: &["decorator"],
    string_kinds: &["string", "template_string"],
    comment_kinds: &["comment"],
    doc_markers: &["/**"],
    normalize,
};

fn normalize(kind: &str) -> GastKind {
    match kind {
        "function_declaration" | "generator_function_declaration" | "function_expression" => {
            GastKind::Function
        }
        "method_definition" => GastKind::Method,
        "class_declaration" => GastKind::Class,
        "import_statement" => GastKind::Import,
        "export_statement" => GastKind::Export,
        "call_expression" => GastKind::Call,
        "decorator" => GastKind::DecoratorApp,
        "lexical_declaration" | "variable_declaration" => GastKind::VariableDecl,
        "field_definition" => GastKind::Property,
        other => shared_normalize(other).unwrap_or_else(|| GastKind::Other(other.to_string())),
    }
}
