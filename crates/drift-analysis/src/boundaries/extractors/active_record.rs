//! ActiveRecord extractor: model classes and `Model.where(...)` calls.

use crate::parsers::ParseResult;

use super::super::learn::LearnedContext;
use super::super::types::{Boundary, BoundaryOperation, OrmFramework};
use super::FieldExtractor;

const AR_QUERY_METHODS: &[&str] = &[
    "where", "find", "find_by", "all", "first", "last", "create", "create!", "update",
    "update!", "destroy", "destroy_all", "delete", "delete_all", "save", "save!", "pluck",
];

pub struct ActiveRecordExtractor;

impl FieldExtractor for ActiveRecordExtractor {
    fn framework(&self) -> OrmFramework {
        OrmFramework::ActiveRecord
    }

    fn extract(&self, parse: &ParseResult, learned: &LearnedContext) -> Vec<Boundary> {
        let mut out = Vec::new();

        for call in &parse.call_sites {
            if !AR_QUERY_METHODS.contains(&call.name.as_str()) {
                continue;
            }
            let Some(receiver) = &call.receiver else {
                continue;
            };
            // Receiver must look like a model constant: `User.where(...)`.
            let base = receiver.split('.').next().unwrap_or(receiver);
            if !base.chars().next().is_some_and(|c| c.is_uppercase()) {
                continue;
            }
            let table = pluralize(&snake(base));
            // Known tables from the learn pass raise confidence downstream.
            let _known = learned.known_tables.contains(&table);

            out.push(Boundary {
                table,
                framework: OrmFramework::ActiveRecord,
                operation: BoundaryOperation::from_method(&call.name),
                fields: Vec::new(),
                file: parse.file.clone(),
                line: call.line,
                confidence: 0.0,
            });
        }
        out
    }
}

fn snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn pluralize(name: &str) -> String {
    if name.ends_with('s') {
        name.to_string()
    } else if name.ends_with('y') {
        format!("{}ies", &name[..name.len() - 1])
    } else {
        format!("{name}s")
    }
}
