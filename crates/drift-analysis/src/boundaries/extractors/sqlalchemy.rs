//! SQLAlchemy extractor: declarative models (`__tablename__`, `Column`
//! properties) and session query calls.

use crate::parsers::ParseResult;

use super::super::learn::LearnedContext;
use super::super::types::{Boundary, BoundaryOperation, OrmFramework};
use super::FieldExtractor;

pub struct SqlalchemyExtractor;

impl FieldExtractor for SqlalchemyExtractor {
    fn framework(&self) -> OrmFramework {
        OrmFramework::Sqlalchemy
    }

    fn extract(&self, parse: &ParseResult, _learned: &LearnedContext) -> Vec<Boundary> {
        let mut out = Vec::new();

        // Model declarations: every Column property is a field of the table.
        for class in &parse.classes {
            let table = class
                .properties
                .iter()
                .find(|p| p.name == "__tablename__")
                .map(|_| to_snake_plural(&class.name));
            let Some(table) = table else { continue };

            let fields: Vec<String> = class
                .properties
                .iter()
                .filter(|p| !p.name.starts_with("__"))
                .map(|p| p.name.clone())
                .collect();
            if fields.is_empty() {
                continue;
            }

            out.push(Boundary {
                table,
                framework: OrmFramework::Sqlalchemy,
                operation: BoundaryOperation::Unknown,
                fields,
                file: parse.file.clone(),
                line: class.range.start_line,
                confidence: 0.0,
            });
        }

        // session.query(User).filter(...) style access.
        for call in &parse.call_sites {
            let receiver_is_session = call
                .receiver
                .as_deref()
                .map(|r| {
                    let tail = r.rsplit('.').next().unwrap_or(r);
                    tail == "session" || tail == "db"
                })
                .unwrap_or(false);
            if receiver_is_session && call.name == "query" {
                out.push(Boundary {
                    table: String::new(), // argument model unknown at this level
                    framework: OrmFramework::Sqlalchemy,
                    operation: BoundaryOperation::Read,
                    fields: Vec::new(),
                    file: parse.file.clone(),
                    line: call.line,
                    confidence: 0.0,
                });
            }
        }
        out
    }
}

fn to_snake_plural(name: &str) -> String {
    let mut snake = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                snake.push('_');
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    if snake.ends_with('s') {
        snake
    } else {
        format!("{snake}s")
    }
}
