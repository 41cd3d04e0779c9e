//! Configuration errors - fatal to the affected load, user-visible.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    ReadFailed { path: PathBuf, message: String },

    #[error("malformed TOML in {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("unknown key '{key}' in [{section}]")]
    UnknownKey { section: String, key: String },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("invalid environment override {var}={value}: {message}")]
    InvalidEnv {
        var: String,
        value: String,
        message: String,
    },
}
