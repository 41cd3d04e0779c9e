//! Boundary types.

use serde::{Deserialize, Serialize};

/// ORM frameworks with dedicated extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrmFramework {
    Prisma,
    Sqlalchemy,
    ActiveRecord,
    EfCore,
}

impl OrmFramework {
    pub const ALL: [OrmFramework; 4] = [
        Self::Prisma,
        Self::Sqlalchemy,
        Self::ActiveRecord,
        Self::EfCore,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Prisma => "prisma",
            Self::Sqlalchemy => "sqlalchemy",
            Self::ActiveRecord => "active_record",
            Self::EfCore => "ef_core",
        }
    }
}

impl std::fmt::Display for OrmFramework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryOperation {
    Read,
    Write,
    Delete,
    Unknown,
}

impl BoundaryOperation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
            Self::Unknown => "unknown",
        }
    }

    /// Classify by the access method's name.
    pub fn from_method(method: &str) -> Self {
        let m = method.to_lowercase();
        if m.starts_with("find")
            || m.starts_with("get")
            || m.starts_with("select")
            || m == "all"
            || m == "first"
            || m == "count"
            || m == "aggregate"
            || m == "where"
            || m == "query"
        {
            Self::Read
        } else if m.starts_with("delete") || m.starts_with("destroy") || m.starts_with("remove") {
            Self::Delete
        } else if m.starts_with("create")
            || m.starts_with("insert")
            || m.starts_with("update")
            || m.starts_with("upsert")
            || m.starts_with("save")
        {
            Self::Write
        } else {
            Self::Unknown
        }
    }
}

/// One detected data access point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boundary {
    pub table: String,
    pub framework: OrmFramework,
    pub operation: BoundaryOperation,
    pub fields: Vec<String>,
    pub file: String,
    pub line: u32,
    pub confidence: f64,
}

/// One classified sensitive field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitiveField {
    pub field: String,
    pub table: Option<String>,
    pub class: super::SensitivityClass,
    pub confidence: f64,
    pub file: String,
    pub line: u32,
}
