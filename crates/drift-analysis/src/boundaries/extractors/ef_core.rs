//! EF Core extractor: `DbSet` properties on a `DbContext` plus
//! `_context.Users.Where(...)` access chains.

use crate::parsers::ParseResult;

use super::super::learn::LearnedContext;
use super::super::types::{Boundary, BoundaryOperation, OrmFramework};
use super::FieldExtractor;

const EF_QUERY_METHODS: &[&str] = &[
    "Where", "FirstOrDefault", "First", "Single", "SingleOrDefault", "ToList",
    "ToListAsync", "Find", "FindAsync", "Add", "AddAsync", "Update", "Remove",
    "Include", "Select", "Count", "Any",
];

pub struct EfCoreExtractor;

impl FieldExtractor for EfCoreExtractor {
    fn framework(&self) -> OrmFramework {
        OrmFramework::EfCore
    }

    fn extract(&self, parse: &ParseResult, learned: &LearnedContext) -> Vec<Boundary> {
        let mut out = Vec::new();

        // DbSet declarations describe the table and its entity type.
        for class in &parse.classes {
            if !class.extends.as_deref().is_some_and(|e| e.contains("DbContext")) {
                continue;
            }
            for property in &class.properties {
                if property
                    .type_annotation
                    .as_deref()
                    .is_some_and(|t| t.contains("DbSet"))
                {
                    out.push(Boundary {
                        table: property.name.clone(),
                        framework: OrmFramework::EfCore,
                        operation: BoundaryOperation::Unknown,
                        fields: Vec::new(),
                        file: parse.file.clone(),
                        line: property.line,
                        confidence: 0.0,
                    });
                }
            }
        }

        // Access chains: `_context.Users.Where(...)` - the DbSet segment is
        // the table.
        for call in &parse.call_sites {
            if !EF_QUERY_METHODS.contains(&call.name.as_str()) {
                continue;
            }
            let Some(receiver) = &call.receiver else {
                continue;
            };
            let Some(table) = receiver
                .split('.')
                .find(|segment| learned.known_tables.contains(*segment))
            else {
                continue;
            };
            out.push(Boundary {
                table: table.to_string(),
                framework: OrmFramework::EfCore,
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
