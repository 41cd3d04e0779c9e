//! Python node-kind tables.

use crate::gast::GastKind;
use crate::parsers::types::ClassKind;
use crate::scanner::Language;

use super::{shared_normalize, LanguageSpec};

pub static SPEC: LanguageSpec = LanguageSpec {
    language: Language::Python,
    function_kinds: &["function_definition"],
    method_kinds: &["function_definition"],
    class_kinds: &[("class_definition", ClassKind::Class)],
    import_kinds: &["import_statement", "import_from_statement"],
    export_kinds: &[],
    call_kinds: &["call"],
    decorator_kinds: &["decorator"],
    string_kinds: &["string"],
    comment_kinds: &["comment"],
    doc_markers: &["\"\"\"", "#"],
    normalize,
};

fn normalize(kind: &str) -> GastKind {
    match kind {
        "function_definition" => GastKind::Function,
        "class_definition" => GastKind::Class,
        "import_statement" | "import_from_statement" => GastKind::Import,
        "call" => GastKind::Call,
        "decorator" => GastKind::DecoratorApp,
        "expression_statement" => GastKind::Block,
        "with_statement" => GastKind::TryCatch,
        other => shared_normalize(other).unwrap_or_else(|| GastKind::Other(other.to_string())),
    }
}
