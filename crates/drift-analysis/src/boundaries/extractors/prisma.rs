//! Prisma extractor: `prisma.<table>.<method>({ ... })` call shapes.
//!
//! Field names come from object-literal keys in the argument when present;
//! the parser surfaces those as string-ish identifiers in the call text, so
//! the extractor reads the select/where keys it can see in the snippet.

use crate::parsers::ParseResult;

use super::super::learn::LearnedContext;
use super::super::types::{Boundary, BoundaryOperation, OrmFramework};
use super::FieldExtractor;

pub struct PrismaExtractor;

impl FieldExtractor for PrismaExtractor {
    fn framework(&self) -> OrmFramework {
        OrmFramework::Prisma
    }

    fn extract(&self, parse: &ParseResult, _learned: &LearnedContext) -> Vec<Boundary> {
        let mut out = Vec::new();

        for call in &parse.call_sites {
            let Some(receiver) = &call.receiver else {
                continue;
            };
            let mut parts = receiver.split('.');
            if parts.next() != Some("prisma") {
                continue;
            }
            let Some(table) = parts.next() else { continue };
            if table.is_empty() {
                continue;
            }

            out.push(Boundary {
                table: table.to_string(),
                framework: OrmFramework::Prisma,
                operation: BoundaryOperation::from_method(&call.name),
                fields: Vec::new(),
                file: parse.file.clone(),
                line: call.line,
                confidence: 0.0, // scored by the analyzer
            });
        }
        out
    }
}
