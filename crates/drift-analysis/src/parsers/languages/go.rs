//! Go node-kind tables.

use crate::gast::GastKind;
use crate::parsers::types::ClassKind;
use crate::scanner::Language;

use super::{shared_normalize, LanguageSpec};

pub static SPEC: LanguageSpec = LanguageSpec {
    language: Language::Go,
    function_kinds: &["function_declaration"],
    method_kinds: &["method_declaration"],
    class_kinds: &[("type_declaration", ClassKind::Struct)],
    import_kinds: &["import_declaration"],
    export_kinds: &[],
    call_kinds: &["call_expression"],
    decorator_kinds: &[],
    string_kinds: &["interpreted_string_literal", "raw_string_literal"],
    comment_kinds: &["comment"],
    doc_markers: &["//"],
    normalize,
};

fn normalize(kind: &str) -> GastKind {
    match kind {
        "function_declaration" => GastKind::Function,
        "method_declaration" => GastKind::Method,
        "type_declaration" | "struct_type" => GastKind::Struct,
        "interface_type" => GastKind::Interface,
        "import_declaration" | "import_spec" => GastKind::Import,
        "call_expression" => GastKind::Call,
        "short_var_declaration" | "var_declaration" | "const_declaration" => {
            GastKind::VariableDecl
        }
        "go_statement" | "defer_statement" => GastKind::Block,
        "range_clause" => GastKind::Loop,
        other => shared_normalize(other).unwrap_or_else(|| GastKind::Other(other.to_string())),
    }
}
