//! Convention types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConventionCategory {
    /// Held across ≥80% of files with Established confidence.
    Universal,
    /// Dominant, but narrower than Universal.
    ProjectSpecific,
    /// Rising momentum at Emerging confidence or better.
    Emerging,
    /// Falling momentum or long unseen.
    Legacy,
    /// Top two alternatives within the contested gap - no deviations
    /// flagged for the minority.
    Contested,
}

impl ConventionCategory {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Universal => "universal",
            Self::ProjectSpecific => "project_specific",
            Self::Emerging => "emerging",
            Self::Legacy => "legacy",
            Self::Contested => "contested",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConventionScope {
    Project,
    Directory(String),
    Package(String),
}

impl ConventionScope {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Directory(_) => "directory",
            Self::Package(_) => "package",
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Project => None,
            Self::Directory(path) => Some(path),
            Self::Package(name) => Some(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConventionStatus {
    Discovered,
    Approved,
    Rejected,
    Expired,
}

impl ConventionStatus {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }
}

/// A learned convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Convention {
    pub id: String,
    pub pattern_id: String,
    pub category: ConventionCategory,
    pub scope: ConventionScope,
    pub dominance: f64,
    pub discovered_at: i64,
    pub last_seen: i64,
    pub status: ConventionStatus,
}
