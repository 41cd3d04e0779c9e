//! Per-language grammar bindings and node-kind tables.
//!
//! Each language module exposes a `LanguageSpec`: the tree-sitter grammar,
//! the node kinds that mean "function", "class", "import" and so on in that
//! grammar, and a kind-normalization function for GAST construction. The
//! generic extractor in `super::extract` is driven entirely by this table.

mod csharp;
mod go;
mod java;
mod javascript;
mod kotlin;
mod php;
mod python;
mod ruby;
mod rust_lang;
mod typescript;

use crate::gast::GastKind;
use crate::scanner::Language;

/// Node-kind tables for one grammar.
pub struct LanguageSpec {
    pub language: Language,
    /// Free-standing function declaration kinds.
    pub function_kinds: &'static [&'static str],
    /// Method kinds nested inside class-likes. May overlap function_kinds.
    pub method_kinds: &'static [&'static str],
    /// Class-like declaration kinds, paired with the shape they declare.
    pub class_kinds: &'static [(&'static str, crate::parsers::types::ClassKind)],
    pub import_kinds: &'static [&'static str],
    pub export_kinds: &'static [&'static str],
    pub call_kinds: &'static [&'static str],
    pub decorator_kinds: &'static [&'static str],
    pub string_kinds: &'static [&'static str],
    pub comment_kinds: &'static [&'static str],
    /// Doc-comment markers (`///`, `/**`, `#`, `"""`).
    pub doc_markers: &'static [&'static str],
    /// Grammar-kind → GAST-kind mapping for normalization.
    pub normalize: fn(&str) -> GastKind,
}

/// Kind names that mean the same thing in most of the ten grammars.
/// Language `normalize` functions try their own cases first, then this.
pub(crate) fn shared_normalize(kind: &str) -> Option<GastKind> {
    Some(match kind {
        "identifier" | "property_identifier" | "type_identifier" | "field_identifier"
        | "shorthand_property_identifier" | "constant" => GastKind::Identifier,
        "string" | "string_literal" | "interpreted_string_literal" | "raw_string_literal"
        | "string_content" | "encapsed_string" => GastKind::StringLit,
        "number" | "integer" | "float" | "int_literal" | "float_literal"
        | "decimal_integer_literal" | "decimal_floating_point_literal" | "integer_literal"
        | "real_literal" => GastKind::NumberLit,
        "true" | "false" | "boolean" | "boolean_literal" => GastKind::BoolLit,
        "null" | "nil" | "undefined" | "null_literal" | "none" => GastKind::NullLit,
        "comment" | "line_comment" | "block_comment" | "doc_comment" => GastKind::Comment,
        "return_statement" | "return_expression" => GastKind::Return,
        "throw_statement" | "raise_statement" | "throw_expression" => GastKind::Throw,
        "if_statement" | "if_expression" => GastKind::If,
        "for_statement" | "while_statement" | "for_in_statement" | "do_statement"
        | "loop_expression" | "while_expression" | "for_expression"
        | "foreach_statement" | "for_numeric" | "while" | "for" | "until" => GastKind::Loop,
        "switch_statement" | "switch_expression" | "match_expression" | "match_statement"
        | "when_expression" | "case_statement" => GastKind::Switch,
        "try_statement" | "try_expression" | "begin" | "rescue" => GastKind::TryCatch,
        "await_expression" | "await" => GastKind::Await,
        "yield_expression" | "yield" => GastKind::Yield,
        "binary_expression" | "binary_operator" | "comparison_operator" => GastKind::BinaryOp,
        "unary_expression" | "unary_operator" | "not_operator" => GastKind::UnaryOp,
        "conditional_expression" | "ternary_expression" => GastKind::Ternary,
        "array" | "array_literal" | "list" | "array_expression"
        | "array_creation_expression" => GastKind::ArrayExpr,
        "object" | "dictionary" | "hash" | "object_creation_expression"
        | "struct_expression" => GastKind::ObjectExpr,
        "template_string" | "template_literal" | "interpolated_string_expression"
        | "string_interpolation" | "heredoc_body" => GastKind::TemplateLit,
        "assignment" | "assignment_expression" | "augmented_assignment"
        | "augmented_assignment_expression" | "compound_assignment_expr"
        | "operator_assignment" => GastKind::Assignment,
        "member_expression" | "attribute" | "field_expression" | "field_access"
        | "member_access_expression" | "navigation_expression" | "scoped_identifier"
        | "selector_expression" | "member_access" => GastKind::MemberAccess,
        "subscript_expression" | "subscript" | "index_expression"
        | "element_access_expression" => GastKind::IndexAccess,
        "block" | "statement_block" | "compound_statement" | "body" => GastKind::Block,
        "lambda" | "arrow_function" | "lambda_expression" | "closure_expression"
        | "anonymous_function" | "func_literal" | "lambda_literal" => GastKind::Lambda,
        "new_expression" => GastKind::New,
        "parameter" | "formal_parameter" | "required_parameter" | "optional_parameter"
        | "typed_parameter" | "simple_parameter" => GastKind::Parameter,
        _ => return None,
    })
}

/// The spec table for a language.
pub fn spec_for(language: Language) -> &'static LanguageSpec {
    match language {
        Language::TypeScript => &typescript::SPEC,
        Language::JavaScript => &javascript::SPEC,
        Language::Python => &python::SPEC,
        Language::Java => &java::SPEC,
        Language::CSharp => &csharp::SPEC,
        Language::Go => &go::SPEC,
        Language::Rust => &rust_lang::SPEC,
        Language::Ruby => &ruby::SPEC,
        Language::Php => &php::SPEC,
        Language::Kotlin => &kotlin::SPEC,
    }
}

/// The tree-sitter grammar for a language, honoring the TSX dialect.
pub fn grammar_for(language: Language, extension: Option<&str>) -> tree_sitter::Language {
    match language {
        Language::TypeScript => {
            if extension == Some("tsx") {
                tree_sitter_typescript::LANGUAGE_TSX.into()
            } else {
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
            }
        }
        Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        Language::Python => tree_sitter_python::LANGUAGE.into(),
        Language::Java => tree_sitter_java::LANGUAGE.into(),
        Language::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
        Language::Go => tree_sitter_go::LANGUAGE.into(),
        Language::Rust => tree_sitter_rust::LANGUAGE.into(),
        Language::Ruby => tree_sitter_ruby::LANGUAGE.into(),
        Language::Php => tree_sitter_php::LANGUAGE_PHP.into(),
        Language::Kotlin => tree_sitter_kotlin_sg::LANGUAGE.into(),
    }
}
