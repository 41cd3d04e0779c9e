//! Ruby node-kind tables.

use crate::gast::GastKind;
use crate::parsers::types::ClassKind;
use crate::scanner::Language;

use super::{shared_normalize, LanguageSpec};

pub static SPEC: LanguageSpec = LanguageSpec {
    language: Language::Ruby,
    function_kinds: &["method"],
    method_kinds: &["method", "singleton_method"],
    class_kinds: &[
        ("class", ClassKind::Class),
        ("module", ClassKind::Class),
    ],
    import_kinds: &[],
    export_kinds: &[],
    call_kinds: &["call", "method_call"],
    decorator_kinds: &[],
    string_kinds: &["string"],
    comment_kinds: &["comment"],
    doc_markers: &["#"],
    normalize,
};

fn normalize(kind: &str) -> GastKind {
    match kind {
        "method" | "singleton_method" => GastKind::Method,
        "class" => GastKind::Class,
        "module" => GastKind::Module,
        "call" | "method_call" => GastKind::Call,
        "assignment" => GastKind::Assignment,
        "do_block" | "block" => GastKind::Block,
        "begin" => GastKind::TryCatch,
        "case" => GastKind::Switch,
        other => shared_normalize(other).unwrap_or_else(|| GastKind::Other(other.to_string())),
    }
}
