//! The root configuration document and its sections.
//!
//! Sections are strict: an unknown key inside any section fails the load
//! with a `ConfigError`, surfaced by serde's `deny_unknown_fields`.

use serde::{Deserialize, Serialize};

/// Root configuration. All sections optional in the file; defaults apply.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DriftConfig {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub learning: LearningConfig,
    #[serde(default)]
    pub backup: BackupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Reject files larger than this many bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    /// Extra ignore file honored alongside .gitignore.
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,
    /// Worker threads; 0 means one per core.
    #[serde(default)]
    pub threads: usize,
    /// Re-hash every file even when mtime is unchanged.
    #[serde(default)]
    pub force_full: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size(),
            ignore_file: default_ignore_file(),
            threads: 0,
            force_full: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Path to a project-local pattern definition file, relative to root.
    #[serde(default = "default_patterns_file")]
    pub patterns_file: String,
    /// Path to a project-local taint registry file, relative to root.
    #[serde(default = "default_taint_file")]
    pub taint_registry_file: String,
    /// Minimum similarity for fuzzy call resolution.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_similarity_threshold: f64,
    /// Max BFS depth for reachability queries.
    #[serde(default = "default_reachability_depth")]
    pub reachability_max_depth: u32,
    /// Node count above which BFS falls back to recursive-CTE SQL.
    #[serde(default = "default_cte_threshold")]
    pub cte_node_threshold: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            patterns_file: default_patterns_file(),
            taint_registry_file: default_taint_file(),
            fuzzy_similarity_threshold: default_fuzzy_threshold(),
            reachability_max_depth: default_reachability_depth(),
            cte_node_threshold: default_cte_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Database file name, created at the project root.
    #[serde(default = "default_db_file")]
    pub db_file: String,
    /// Read pool size.
    #[serde(default = "default_read_pool")]
    pub read_pool_size: usize,
    /// Batch ingest channel capacity.
    #[serde(default = "default_channel_capacity")]
    pub ingest_channel_capacity: usize,
    /// Maximum rows per ingest transaction.
    #[serde(default = "default_batch_rows")]
    pub max_batch_rows: usize,
    /// Retain append-only rows for at most this many days.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Retain at most this many rows per append-only table.
    #[serde(default = "default_retention_rows")]
    pub retention_max_rows: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_file: default_db_file(),
            read_pool_size: default_read_pool(),
            ingest_channel_capacity: default_channel_capacity(),
            max_batch_rows: default_batch_rows(),
            retention_days: default_retention_days(),
            retention_max_rows: default_retention_rows(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LearningConfig {
    /// Minimum occurrences before a pattern can become a convention.
    #[serde(default = "default_min_occurrences")]
    pub min_occurrences: u32,
    /// Minimum distinct files before a pattern can become a convention.
    #[serde(default = "default_min_files")]
    pub min_file_spread: u32,
    /// Required dominance ratio over alternatives.
    #[serde(default = "default_dominance")]
    pub dominance_threshold: f64,
    /// Top-two gap below which a gene is Contested.
    #[serde(default = "default_contested_gap")]
    pub contested_gap: f64,
    /// Days of absence before a convention expires.
    #[serde(default = "default_expiry_days")]
    pub expiry_days: u32,
    /// Fraction of changed files that triggers a full re-learn.
    #[serde(default = "default_relearn_fraction")]
    pub full_relearn_fraction: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            min_occurrences: default_min_occurrences(),
            min_file_spread: default_min_files(),
            dominance_threshold: default_dominance(),
            contested_gap: default_contested_gap(),
            expiry_days: default_expiry_days(),
            full_relearn_fraction: default_relearn_fraction(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BackupConfig {
    /// Keep this many rotated backups of the database.
    #[serde(default = "default_backup_keep")]
    pub keep: u32,
    /// Restore from the newest backup when corruption is detected.
    #[serde(default = "default_true")]
    pub restore_on_corruption: bool,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            keep: default_backup_keep(),
            restore_on_corruption: default_true(),
        }
    }
}

fn default_max_file_size() -> u64 {
    1024 * 1024
}
fn default_ignore_file() -> String {
    ".driftignore".to_string()
}
fn default_patterns_file() -> String {
    "drift-patterns.toml".to_string()
}
fn default_taint_file() -> String {
    "drift-taint.toml".to_string()
}
fn default_fuzzy_threshold() -> f64 {
    0.85
}
fn default_reachability_depth() -> u32 {
    20
}
fn default_cte_threshold() -> usize {
    10_000
}
fn default_db_file() -> String {
    "drift.db".to_string()
}
fn default_read_pool() -> usize {
    4
}
fn default_channel_capacity() -> usize {
    1024
}
fn default_batch_rows() -> usize {
    500
}
fn default_retention_days() -> u32 {
    90
}
fn default_retention_rows() -> u64 {
    10_000
}
fn default_min_occurrences() -> u32 {
    3
}
fn default_min_files() -> u32 {
    2
}
fn default_dominance() -> f64 {
    0.60
}
fn default_contested_gap() -> f64 {
    0.20
}
fn default_expiry_days() -> u32 {
    90
}
fn default_relearn_fraction() -> f64 {
    0.10
}
fn default_backup_keep() -> u32 {
    3
}
fn default_true() -> bool {
    true
}
