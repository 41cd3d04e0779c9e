//! Learn phase: which ORMs the project uses, how it names tables, and
//! which variables stand in for which tables.

use drift_core::types::collections::{FxHashMap, FxHashSet};

use crate::parsers::ParseResult;

use super::types::OrmFramework;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableNamingStyle {
    Snake,
    Camel,
    Pascal,
    Mixed,
}

impl TableNamingStyle {
    fn of(name: &str) -> TableNamingStyle {
        let has_underscore = name.contains('_');
        let first_upper = name.chars().next().is_some_and(|c| c.is_uppercase());
        let has_upper = name.chars().any(|c| c.is_uppercase());
        match (has_underscore, first_upper, has_upper) {
            (true, false, false) => TableNamingStyle::Snake,
            (false, false, true) => TableNamingStyle::Camel,
            (false, true, _) => TableNamingStyle::Pascal,
            (false, false, false) => TableNamingStyle::Snake,
            _ => TableNamingStyle::Mixed,
        }
    }
}

/// Everything the detect phase needs from the learn pass.
#[derive(Debug, Default)]
pub struct LearnedContext {
    pub frameworks: FxHashSet<OrmFramework>,
    pub naming: Option<TableNamingStyle>,
    pub known_tables: FxHashSet<String>,
    /// `userRepo` → `users`-style variable hints.
    pub variable_tables: FxHashMap<String, String>,
}

impl LearnedContext {
    /// Walk files likely to contain data-access code and infer framework
    /// usage, table naming, and variable hints.
    pub fn learn(parses: &[&ParseResult]) -> Self {
        let mut ctx = LearnedContext::default();
        let mut naming_votes: FxHashMap<TableNamingStyle, usize> = FxHashMap::default();

        for parse in parses {
            for import in &parse.imports {
                let module = import.module.to_lowercase();
                if module.contains("@prisma/client") || module.contains("prisma") {
                    ctx.frameworks.insert(OrmFramework::Prisma);
                }
                if module.starts_with("sqlalchemy") {
                    ctx.frameworks.insert(OrmFramework::Sqlalchemy);
                }
                if module.contains("active_record") || module.contains("activerecord") {
                    ctx.frameworks.insert(OrmFramework::ActiveRecord);
                }
                if module.contains("entityframeworkcore") || module.contains("microsoft.entityframeworkcore") {
                    ctx.frameworks.insert(OrmFramework::EfCore);
                }
            }

            for class in &parse.classes {
                // ActiveRecord: `class User < ApplicationRecord`.
                if class
                    .extends
                    .as_deref()
                    .is_some_and(|e| e.contains("ApplicationRecord") || e.contains("ActiveRecord"))
                {
                    ctx.frameworks.insert(OrmFramework::ActiveRecord);
                    ctx.known_tables.insert(pluralize_snake(&class.name));
                }
                // EF Core: `class AppDb : DbContext` with DbSet properties.
                if class.extends.as_deref().is_some_and(|e| e.contains("DbContext")) {
                    ctx.frameworks.insert(OrmFramework::EfCore);
                    for property in &class.properties {
                        if property
                            .type_annotation
                            .as_deref()
                            .is_some_and(|t| t.contains("DbSet"))
                        {
                            ctx.known_tables.insert(property.name.clone());
                        }
                    }
                }
                // SQLAlchemy: `__tablename__` attribute or Base superclass.
                if class.extends.as_deref().is_some_and(|e| e.contains("Base")) {
                    for property in &class.properties {
                        if property.name == "__tablename__" {
                            ctx.frameworks.insert(OrmFramework::Sqlalchemy);
                        }
                    }
                }
            }

            // Prisma client accesses name the table directly: prisma.user.
            for call in &parse.call_sites {
                if let Some(receiver) = &call.receiver {
                    let mut parts = receiver.split('.');
                    if parts.next() == Some("prisma") {
                        if let Some(table) = parts.next() {
                            ctx.frameworks.insert(OrmFramework::Prisma);
                            ctx.known_tables.insert(table.to_string());
                        }
                    }
                    // Repo-style variable hints: userRepo.find → users.
                    let base = receiver.split('.').next().unwrap_or(receiver);
                    if let Some(table) = table_hint_of(base) {
                        ctx.variable_tables.insert(base.to_string(), table);
                    }
                }
            }
        }

        for table in &ctx.known_tables {
            *naming_votes.entry(TableNamingStyle::of(table)).or_insert(0) += 1;
        }
        ctx.naming = naming_votes
            .into_iter()
            .max_by_key(|(_, count)| *count)
            .map(|(style, _)| style);

        ctx
    }

    /// Heuristic gate for which files the learn pass reads at all.
    pub fn is_data_access_candidate(parse: &ParseResult) -> bool {
        let path = parse.file.to_lowercase();
        if path.contains("model") || path.contains("repo") || path.contains("entit")
            || path.contains("schema") || path.contains("dao") || path.contains("db")
        {
            return true;
        }
        parse.imports.iter().any(|i| {
            let m = i.module.to_lowercase();
            m.contains("prisma") || m.starts_with("sqlalchemy") || m.contains("entityframework")
                || m.contains("active_record")
        })
    }
}

/// `userRepo` / `orderRepository` → `users` / `orders`.
fn table_hint_of(variable: &str) -> Option<String> {
    let lower = variable.to_lowercase();
    for suffix in ["repository", "repo", "dao", "store"] {
        if let Some(stem) = lower.strip_suffix(suffix) {
            if !stem.is_empty() {
                return Some(pluralize_snake(stem));
            }
        }
    }
    None
}

fn pluralize_snake(name: &str) -> String {
    let snake = to_snake(name);
    if snake.ends_with('s') {
        snake
    } else if snake.ends_with('y') {
        format!("{}ies", &snake[..snake.len() - 1])
    } else {
        format!("{snake}s")
    }
}

fn to_snake(name: &str) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Language;

    #[test]
    fn variable_hints() {
        assert_eq!(table_hint_of("userRepo"), Some("users".to_string()));
        assert_eq!(table_hint_of("orderRepository"), Some("orders".to_string()));
        assert_eq!(table_hint_of("categoryRepo"), Some("categories".to_string()));
        assert_eq!(table_hint_of("db"), None);
    }

    #[test]
    fn learns_prisma_tables_from_call_receivers() {
        let mut parse = ParseResult::empty("src/svc.ts".into(), Language::TypeScript, 1);
        parse.call_sites.push(crate::parsers::types::CallSite {
            name: "findMany".into(),
            receiver: Some("prisma.user".into()),
            line: 4,
            column: 0,
            argument_count: 1,
            caller: None,
        });
        let ctx = LearnedContext::learn(&[&parse]);
        assert!(ctx.frameworks.contains(&OrmFramework::Prisma));
        assert!(ctx.known_tables.contains("user"));
    }
}
