//! Per-file detection context: the kind index built by the single pass.

use drift_core::types::collections::FxHashMap;

use crate::gast::{GastKind, GastNode};
use crate::parsers::ParseResult;
use crate::scanner::Language;

/// GAST nodes bucketed by kind name. Built once per file; detectors index
/// into it instead of re-walking the tree.
pub struct KindIndex<'a> {
    buckets: FxHashMap<&'a str, Vec<&'a GastNode>>,
}

impl<'a> KindIndex<'a> {
    pub fn build(root: &'a GastNode) -> Self {
        let mut buckets: FxHashMap<&'a str, Vec<&'a GastNode>> = FxHashMap::default();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            buckets.entry(node.kind.name()).or_default().push(node);
            stack.extend(node.children.iter());
        }
        Self { buckets }
    }

    pub fn nodes(&self, kind: &GastKind) -> &[&'a GastNode] {
        self.by_name(kind.name())
    }

    pub fn by_name(&self, kind_name: &str) -> &[&'a GastNode] {
        self.buckets
            .get(kind_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn total_nodes(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Everything a detector may read for one file.
pub struct DetectionContext<'a> {
    pub file: &'a str,
    pub language: Language,
    pub parse: &'a ParseResult,
    pub gast: &'a GastNode,
    pub kinds: KindIndex<'a>,
}

impl<'a> DetectionContext<'a> {
    pub fn build(
        file: &'a str,
        language: Language,
        parse: &'a ParseResult,
        gast: &'a GastNode,
    ) -> Self {
        Self {
            file,
            language,
            parse,
            gast,
            kinds: KindIndex::build(gast),
        }
    }
}
