//! Data-access call detection. Feeds both pattern aggregation and the
//! boundary analyzer's sink list.

use crate::engine::{pattern_id_for, DetectionContext, PatternCategory, PatternMatch};

use super::traits::{Detector, DetectorVariant};

const QUERY_METHODS: &[&str] = &[
    "query", "execute", "exec", "find", "findOne", "findMany", "findAll", "findUnique",
    "save", "insert", "update", "updateMany", "delete", "deleteMany", "create", "upsert",
    "aggregate", "count", "raw", "all", "first", "get", "where", "select",
];

const DB_RECEIVER_HINTS: &[&str] = &[
    "db", "database", "conn", "connection", "client", "prisma", "knex", "pool",
    "session", "repo", "repository", "orm", "model", "collection", "table", "store",
    "em", "entitymanager", "context", "dbcontext",
];

pub struct DataAccessDetector;

impl DataAccessDetector {
    /// Whether a call looks like a data access, by method + receiver shape.
    pub fn is_data_access(name: &str, receiver: Option<&str>) -> bool {
        if !QUERY_METHODS.contains(&name) {
            return false;
        }
        let Some(receiver) = receiver else {
            return false;
        };
        let tail = receiver
            .rsplit(['.', ':', '>'])
            .next()
            .unwrap_or(receiver)
            .to_lowercase();
        DB_RECEIVER_HINTS
            .iter()
            .any(|hint| tail == *hint || tail.ends_with(hint))
    }
}

impl Detector for DataAccessDetector {
    fn id(&self) -> &'static str {
        "data-access"
    }

    fn category(&self) -> PatternCategory {
        PatternCategory::Data
    }

    fn variant(&self) -> DetectorVariant {
        DetectorVariant::Semantic
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<PatternMatch> {
        ctx.parse
            .call_sites
            .iter()
            .filter(|call| Self::is_data_access(&call.name, call.receiver.as_deref()))
            .map(|call| PatternMatch {
                pattern_id: pattern_id_for(self.id(), &call.name),
                detector_id: self.id().to_string(),
                category: self.category(),
                file: ctx.file.to_string(),
                line: call.line,
                column: call.column,
                confidence: 0.8,
                snippet: call
                    .receiver
                    .as_ref()
                    .map(|r| format!("{r}.{}", call.name)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_query_is_data_access() {
        assert!(DataAccessDetector::is_data_access("query", Some("db")));
        assert!(DataAccessDetector::is_data_access("findMany", Some("prisma.user")));
    }

    #[test]
    fn plain_call_is_not() {
        assert!(!DataAccessDetector::is_data_access("render", Some("db")));
        assert!(!DataAccessDetector::is_data_access("query", None));
        assert!(!DataAccessDetector::is_data_access("query", Some("parser")));
    }
}
