//! Generic structural extraction, driven by each language's `LanguageSpec`.
//!
//! One recursive walk collects functions, classes, imports, exports, call
//! sites, decorators, string literals, and doc comments. Error nodes are
//! collected as ranges; extraction continues on the valid subtrees.

use drift_core::types::collections::SmallVec;

use crate::scanner::{hash_bytes, Language};

use super::languages::LanguageSpec;
use super::types::{
    CallSite, ClassInfo, DecoratorInfo, DocComment, ExportInfo, FunctionInfo, ImportInfo,
    ImportedName, ParameterInfo, ParseResult, PropertyInfo, Range, StringLiteral,
};

pub fn extract(
    tree: &tree_sitter::Tree,
    source: &[u8],
    file: &str,
    language: Language,
    content_hash: u64,
    spec: &LanguageSpec,
) -> ParseResult {
    let mut out = ParseResult::empty(file.to_string(), language, content_hash);
    let mut ctx = Ctx {
        spec,
        source,
        out: &mut out,
        class_stack: Vec::new(),
        function_stack: Vec::new(),
    };
    visit(tree.root_node(), &mut ctx);
    let has_errors = !out.error_ranges.is_empty() || tree.root_node().has_error();
    out.has_errors = has_errors;
    out
}

struct Ctx<'a> {
    spec: &'a LanguageSpec,
    source: &'a [u8],
    out: &'a mut ParseResult,
    class_stack: Vec<String>,
    function_stack: Vec<String>,
}

fn visit(node: tree_sitter::Node, ctx: &mut Ctx<'_>) {
    if node.is_error() || node.is_missing() {
        ctx.out.error_ranges.push(Range::from_node(&node));
        // Children of an error node can still be structurally valid.
    }

    let kind = node.kind();
    let spec = ctx.spec;

    let is_class = spec.class_kinds.iter().find(|(k, _)| *k == kind);
    let is_function = spec.function_kinds.contains(&kind) || spec.method_kinds.contains(&kind);

    if let Some((_, class_kind)) = is_class {
        let info = extract_class(node, *class_kind, ctx);
        let name = info.name.clone();
        ctx.out.classes.push(info);
        ctx.class_stack.push(name);
        visit_children(node, ctx);
        ctx.class_stack.pop();
        return;
    }

    if is_function {
        if let Some(info) = extract_function(node, ctx) {
            let qualified = info.qualified_name.clone();
            ctx.out.functions.push(info);
            ctx.function_stack.push(qualified);
            visit_children(node, ctx);
            ctx.function_stack.pop();
            return;
        }
    }

    if spec.import_kinds.contains(&kind) {
        let import = extract_import(node, ctx);
        ctx.out.imports.push(import);
    } else if spec.export_kinds.contains(&kind) {
        let export = extract_export(node, ctx);
        ctx.out.exports.push(export);
    } else if spec.call_kinds.contains(&kind) {
        if let Some(site) = extract_call(node, ctx) {
            ctx.out.call_sites.push(site);
        }
    } else if spec.decorator_kinds.contains(&kind) {
        if let Some(deco) = extract_decorator(node, ctx) {
            ctx.out.decorators.push(deco);
        }
    } else if spec.string_kinds.contains(&kind) {
        if let Some(lit) = extract_string(node, ctx) {
            ctx.out.string_literals.push(lit);
        }
    } else if spec.comment_kinds.contains(&kind) {
        if let Some(doc) = extract_doc_comment(node, ctx) {
            ctx.out.doc_comments.push(doc);
        }
    }

    visit_children(node, ctx);
}

fn visit_children(node: tree_sitter::Node, ctx: &mut Ctx<'_>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(child, ctx);
    }
}

fn text<'s>(node: &tree_sitter::Node, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or("")
}

/// Declared name: the `name` field when the grammar has one, else the first
/// identifier-ish child.
fn declared_name(node: tree_sitter::Node, source: &[u8]) -> Option<String> {
    if let Some(name) = node.child_by_field_name("name") {
        return Some(text(&name, source).to_string());
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind().contains("identifier") || child.kind() == "constant" {
            return Some(text(&child, source).to_string());
        }
    }
    None
}

fn extract_function(node: tree_sitter::Node, ctx: &mut Ctx<'_>) -> Option<FunctionInfo> {
    let source = ctx.source;
    let name = declared_name(node, source)?;
    if name.is_empty() {
        return None;
    }

    let is_method = !ctx.class_stack.is_empty();
    let qualified_name = match ctx.class_stack.last() {
        Some(class) => format!("{class}.{name}"),
        None => name.clone(),
    };

    let body = node.child_by_field_name("body");
    let (signature, body_hash) = match body {
        Some(body) => {
            let sig_end = body.start_byte().saturating_sub(node.start_byte());
            let full = text(&node, source);
            let signature = full
                .get(..sig_end.min(full.len()))
                .unwrap_or(full)
                .trim()
                .to_string();
            (signature, hash_bytes(text(&body, source).as_bytes()))
        }
        None => {
            let full = text(&node, source);
            let head: String = full.lines().next().unwrap_or("").trim().to_string();
            (head, hash_bytes(full.as_bytes()))
        }
    };

    let mut parameters: SmallVec<[ParameterInfo; 4]> = SmallVec::new();
    if let Some(params) = node
        .child_by_field_name("parameters")
        .or_else(|| node.child_by_field_name("parameter_list"))
    {
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            if !param.is_named() || param.kind().contains("comment") {
                continue;
            }
            let pname = declared_name(param, source)
                .unwrap_or_else(|| text(&param, source).to_string());
            let type_annotation = param
                .child_by_field_name("type")
                .map(|t| text(&t, source).to_string());
            parameters.push(ParameterInfo {
                name: pname,
                type_annotation,
            });
        }
    }

    let return_type = node
        .child_by_field_name("return_type")
        .or_else(|| node.child_by_field_name("result"))
        .map(|t| text(&t, source).to_string());

    let range = Range::from_node(&node);
    let is_exported = is_exported(node, &name, ctx.spec.language);

    Some(FunctionInfo {
        name,
        qualified_name,
        is_async: signature.contains("async "),
        signature,
        body_hash,
        start_line: range.start_line,
        end_line: range.end_line,
        parameters,
        return_type,
        is_exported,
        is_method,
        decorators: leading_decorators(node, ctx),
        range,
    })
}

/// Exported-ness: wrapped in an export statement, or public by the
/// language's own convention (Go capitalization, Rust `pub`).
fn is_exported(node: tree_sitter::Node, name: &str, language: Language) -> bool {
    match language {
        Language::Go => name.chars().next().is_some_and(|c| c.is_uppercase()),
        Language::Rust => node
            .prev_sibling()
            .map(|s| s.kind() == "visibility_modifier")
            .unwrap_or(false)
            || node
                .child(0)
                .map(|c| c.kind() == "visibility_modifier")
                .unwrap_or(false),
        _ => {
            let mut current = node;
            for _ in 0..2 {
                match current.parent() {
                    Some(parent) => {
                        if parent.kind().starts_with("export") {
                            return true;
                        }
                        current = parent;
                    }
                    None => break,
                }
            }
            false
        }
    }
}

/// Decorators written on the lines directly above the declaration.
fn leading_decorators(node: tree_sitter::Node, ctx: &Ctx<'_>) -> Vec<String> {
    let mut out = Vec::new();
    let mut sibling = node.prev_named_sibling();
    while let Some(prev) = sibling {
        if ctx.spec.decorator_kinds.contains(&prev.kind()) {
            out.push(text(&prev, ctx.source).trim().to_string());
            sibling = prev.prev_named_sibling();
        } else {
            break;
        }
    }
    // Python wraps the whole thing in decorated_definition instead.
    if let Some(parent) = node.parent() {
        if parent.kind() == "decorated_definition" {
            let mut cursor = parent.walk();
            for child in parent.named_children(&mut cursor) {
                if ctx.spec.decorator_kinds.contains(&child.kind()) {
                    out.push(text(&child, ctx.source).trim().to_string());
                }
            }
        }
    }
    out.reverse();
    out
}

fn extract_class(
    node: tree_sitter::Node,
    kind: super::types::ClassKind,
    ctx: &mut Ctx<'_>,
) -> ClassInfo {
    let source = ctx.source;
    let name = declared_name(node, source).unwrap_or_default();

    let extends = node
        .child_by_field_name("superclass")
        .or_else(|| node.child_by_field_name("extends"))
        .map(|n| text(&n, source).trim_start_matches(['<', ':', ' ']).to_string());

    let mut methods = Vec::new();
    let mut properties = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            let member_kind = member.kind();
            if ctx.spec.method_kinds.contains(&member_kind)
                || ctx.spec.function_kinds.contains(&member_kind)
            {
                if let Some(mname) = declared_name(member, source) {
                    methods.push(mname);
                }
            } else if member_kind.contains("field")
                || member_kind.contains("property")
                || member_kind == "public_field_definition"
            {
                if let Some(pname) = declared_name(member, source) {
                    properties.push(PropertyInfo {
                        name: pname,
                        type_annotation: member
                            .child_by_field_name("type")
                            .map(|t| text(&t, source).to_string()),
                        line: member.start_position().row as u32,
                    });
                }
            }
        }
    }

    ClassInfo {
        is_exported: is_exported(node, &name, ctx.spec.language),
        decorators: leading_decorators(node, ctx),
        name,
        kind,
        extends,
        implements: SmallVec::new(),
        methods,
        properties,
        range: Range::from_node(&node),
    }
}

fn extract_import(node: tree_sitter::Node, ctx: &mut Ctx<'_>) -> ImportInfo {
    let source = ctx.source;
    let raw = text(&node, source).trim().to_string();

    // The module is the first string literal child when the grammar has one
    // (TS/JS/Ruby require), otherwise the dotted path after the keyword.
    let module = first_string_child(node, ctx)
        .unwrap_or_else(|| {
            raw.split_whitespace()
                .nth(1)
                .unwrap_or("")
                .trim_end_matches(';')
                .to_string()
        });

    let mut names: SmallVec<[ImportedName; 4]> = SmallVec::new();
    collect_import_names(node, ctx, &mut names);

    ImportInfo {
        is_type_only: raw.starts_with("import type"),
        line: node.start_position().row as u32,
        raw,
        module,
        names,
    }
}

fn first_string_child(node: tree_sitter::Node, ctx: &Ctx<'_>) -> Option<String> {
    let mut cursor = node.walk();
    let mut stack: Vec<tree_sitter::Node> = node.children(&mut cursor).collect();
    while let Some(n) = stack.pop() {
        if ctx.spec.string_kinds.contains(&n.kind()) {
            return Some(strip_quotes(text(&n, ctx.source)).to_string());
        }
        let mut c = n.walk();
        stack.extend(n.children(&mut c));
    }
    None
}

fn collect_import_names(
    node: tree_sitter::Node,
    ctx: &Ctx<'_>,
    names: &mut SmallVec<[ImportedName; 4]>,
) {
    let mut cursor = node.walk();
    let mut stack: Vec<tree_sitter::Node> = node.children(&mut cursor).collect();
    while let Some(n) = stack.pop() {
        match n.kind() {
            "import_specifier" | "aliased_import" | "namespace_import" => {
                let name = n
                    .child_by_field_name("name")
                    .map(|c| text(&c, ctx.source).to_string())
                    .unwrap_or_else(|| text(&n, ctx.source).to_string());
                let alias = n
                    .child_by_field_name("alias")
                    .map(|c| text(&c, ctx.source).to_string());
                names.push(ImportedName { name, alias });
            }
            "identifier" | "dotted_name" | "scoped_identifier" => {
                // Top-level default / bare imports.
                if n.parent().map(|p| p.id()) == Some(node.id()) {
                    names.push(ImportedName {
                        name: text(&n, ctx.source).to_string(),
                        alias: None,
                    });
                }
            }
            _ => {}
        }
        let mut c = n.walk();
        stack.extend(n.children(&mut c));
    }
}

fn extract_export(node: tree_sitter::Node, ctx: &mut Ctx<'_>) -> ExportInfo {
    let source = ctx.source;
    let raw = text(&node, source);
    let is_default = raw.starts_with("export default");

    // The exported declaration's own name, when the export wraps one.
    let name = node
        .named_child(0)
        .and_then(|decl| declared_name(decl, source))
        .filter(|n| !n.is_empty());

    ExportInfo {
        name,
        is_default,
        line: node.start_position().row as u32,
    }
}

fn extract_call(node: tree_sitter::Node, ctx: &mut Ctx<'_>) -> Option<CallSite> {
    let source = ctx.source;
    let full = text(&node, source);
    let head = full.split('(').next().unwrap_or(full).trim();
    if head.is_empty() {
        return None;
    }

    // Split the callee chain on the language's member separator.
    let (receiver, name) = split_callee(head);
    if name.is_empty() || !name.chars().next().is_some_and(valid_name_start) {
        return None;
    }

    let argument_count = node
        .child_by_field_name("arguments")
        .map(|args| args.named_child_count().min(255) as u8)
        .unwrap_or(0);

    let pos = node.start_position();
    Some(CallSite {
        name,
        receiver,
        line: pos.row as u32,
        column: pos.column as u32,
        argument_count,
        caller: ctx.function_stack.last().cloned(),
    })
}

fn valid_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

/// `a.b.c` → (Some("a.b"), "c"); handles `::` and `->` chains too.
fn split_callee(head: &str) -> (Option<String>, String) {
    let head = head.trim_end_matches('!'); // Rust macro bang
    for sep in [".", "->", "::"] {
        if let Some(idx) = head.rfind(sep) {
            let receiver = head[..idx].trim().to_string();
            let name = head[idx + sep.len()..].trim().to_string();
            // Generic arguments on the name are noise for matching.
            let name = name.split(['<', ' ']).next().unwrap_or("").to_string();
            if !receiver.is_empty() && !name.is_empty() {
                return (Some(receiver), name);
            }
        }
    }
    let head = head.strip_prefix("new ").unwrap_or(head).trim();
    let name = head.split('<').next().unwrap_or(head).to_string();
    (None, name)
}

fn extract_decorator(node: tree_sitter::Node, ctx: &mut Ctx<'_>) -> Option<DecoratorInfo> {
    let raw = text(&node, ctx.source).trim().to_string();
    let name = raw
        .trim_start_matches(['@', '#', '['])
        .split(['(', ']', ' '])
        .next()?
        .to_string();
    if name.is_empty() {
        return None;
    }
    Some(DecoratorInfo {
        name,
        raw,
        line: node.start_position().row as u32,
    })
}

fn extract_string(node: tree_sitter::Node, ctx: &mut Ctx<'_>) -> Option<StringLiteral> {
    let raw = text(&node, ctx.source);
    let value = strip_quotes(raw);
    if value.is_empty() {
        return None;
    }
    let pos = node.start_position();
    Some(StringLiteral {
        value: value.to_string(),
        line: pos.row as u32,
        column: pos.column as u32,
    })
}

fn strip_quotes(raw: &str) -> &str {
    raw.trim_matches(['"', '\'', '`'])
}

fn extract_doc_comment(node: tree_sitter::Node, ctx: &mut Ctx<'_>) -> Option<DocComment> {
    let raw = text(&node, ctx.source).trim();
    let is_doc = ctx.spec.doc_markers.iter().any(|m| raw.starts_with(m));
    if !is_doc {
        return None;
    }
    Some(DocComment {
        text: raw.to_string(),
        line: node.start_position().row as u32,
    })
}
