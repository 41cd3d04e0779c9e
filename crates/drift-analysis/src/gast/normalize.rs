//! Grammar tree → GAST normalization.
//!
//! The shape is shared across languages; per-language knowledge lives in the
//! `normalize` function of each `LanguageSpec`. Anonymous grammar nodes are
//! skipped (their children are lifted), named nodes always survive - either
//! as a generic kind or as `Other(tag)`.

use crate::parsers::languages::LanguageSpec;
use crate::parsers::types::Range;

use super::types::{GastKind, GastNode};

/// Node-count ceiling per file. A pathological file normalizes to a
/// truncated tree instead of exhausting memory.
const MAX_NODES: usize = 200_000;

pub fn normalize_tree(
    tree: &tree_sitter::Tree,
    source: &[u8],
    spec: &LanguageSpec,
) -> GastNode {
    let root = tree.root_node();
    let mut budget = MAX_NODES;
    let mut program = GastNode::new(GastKind::Program, Range::from_node(&root));
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if let Some(node) = build(child, source, spec, &mut budget) {
            program.children.push(node);
        }
        if budget == 0 {
            break;
        }
    }
    program
}

fn build(
    node: tree_sitter::Node,
    source: &[u8],
    spec: &LanguageSpec,
    budget: &mut usize,
) -> Option<GastNode> {
    if *budget == 0 {
        return None;
    }

    // Anonymous nodes (punctuation, keywords) carry no structure of their
    // own; lift their named children instead.
    if !node.is_named() {
        return None;
    }
    *budget -= 1;

    let kind = (spec.normalize)(node.kind());
    let mut out = GastNode::new(kind.clone(), Range::from_node(&node));

    match kind {
        GastKind::Identifier
        | GastKind::StringLit
        | GastKind::NumberLit
        | GastKind::MemberAccess
        | GastKind::TemplateLit
        | GastKind::Comment => {
            out.text = node_text(&node, source);
        }
        GastKind::Function
        | GastKind::Method
        | GastKind::Class
        | GastKind::Interface
        | GastKind::Struct
        | GastKind::Enum
        | GastKind::VariableDecl
        | GastKind::Parameter
        | GastKind::Property => {
            out.name = node
                .child_by_field_name("name")
                .and_then(|n| node_text(&n, source));
        }
        GastKind::Call | GastKind::MethodCall | GastKind::New => {
            // The callee text up to the argument list; detectors and the
            // taint engine match on it.
            out.text = callee_text(&node, source);
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(built) = build(child, source, spec, budget) {
            out.children.push(built);
        }
        if *budget == 0 {
            break;
        }
    }
    Some(out)
}

fn node_text(node: &tree_sitter::Node, source: &[u8]) -> Option<String> {
    node.utf8_text(source).ok().map(|s| s.to_string())
}

/// The call expression's text before its argument list.
fn callee_text(node: &tree_sitter::Node, source: &[u8]) -> Option<String> {
    let full = node.utf8_text(source).ok()?;
    let head = full.split('(').next().unwrap_or(full);
    Some(head.trim().to_string())
}
