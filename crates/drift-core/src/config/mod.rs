//! Configuration loading with layered precedence:
//! CLI overrides > `DRIFT_*` environment > project `drift.toml` >
//! user config > built-in defaults.

mod drift_config;
mod layering;

pub use drift_config::{
    AnalysisConfig, BackupConfig, DriftConfig, LearningConfig, ScanConfig, StorageConfig,
};
pub use layering::{load_config, CliOverrides};
