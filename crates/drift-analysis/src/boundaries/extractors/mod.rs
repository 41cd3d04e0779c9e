//! Per-framework field extractors. Each receives one parsed file plus the
//! learned context and emits raw boundary candidates; the analyzer scores
//! and filters them.

mod active_record;
mod ef_core;
mod prisma;
mod sqlalchemy;

use crate::parsers::ParseResult;

use super::learn::LearnedContext;
use super::types::{Boundary, OrmFramework};

pub trait FieldExtractor: Send + Sync {
    fn framework(&self) -> OrmFramework;
    fn extract(&self, parse: &ParseResult, learned: &LearnedContext) -> Vec<Boundary>;
}

pub fn extractor_for(framework: OrmFramework) -> &'static dyn FieldExtractor {
    match framework {
        OrmFramework::Prisma => &prisma::PrismaExtractor,
        OrmFramework::Sqlalchemy => &sqlalchemy::SqlalchemyExtractor,
        OrmFramework::ActiveRecord => &active_record::ActiveRecordExtractor,
        OrmFramework::EfCore => &ef_core::EfCoreExtractor,
    }
}
