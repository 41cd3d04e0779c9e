//! Layered configuration assembly.
//!
//! Precedence, lowest first: built-in defaults, user config
//! (`~/.config/drift/config.toml`), project `drift.toml`, `DRIFT_*`
//! environment variables, explicit CLI overrides. Later layers win
//! per-field; TOML layers are merged at document level before deserializing
//! so a project file only overrides the keys it sets.

use std::path::{Path, PathBuf};

use crate::errors::ConfigError;

use super::drift_config::DriftConfig;

/// Overrides supplied by a hosting command surface. Only set fields apply.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub max_file_size_bytes: Option<u64>,
    pub threads: Option<usize>,
    pub force_full: Option<bool>,
    pub db_file: Option<String>,
}

/// Load the effective configuration for a project root.
pub fn load_config(
    project_root: &Path,
    cli: &CliOverrides,
) -> Result<DriftConfig, ConfigError> {
    let mut doc = toml::Table::new();

    if let Some(user_path) = user_config_path() {
        if user_path.exists() {
            merge_file(&mut doc, &user_path)?;
        }
    }

    let project_path = project_root.join("drift.toml");
    if project_path.exists() {
        merge_file(&mut doc, &project_path)?;
    }

    let mut config: DriftConfig =
        toml::Value::Table(doc)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Malformed {
                path: project_path.clone(),
                message: e.to_string(),
            })?;

    apply_env(&mut config)?;
    apply_cli(&mut config, cli);
    validate(&config)?;
    Ok(config)
}

fn user_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".config/drift/config.toml"))
}

fn merge_file(doc: &mut toml::Table, path: &Path) -> Result<(), ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let layer: toml::Table = toml::from_str(&text).map_err(|e| ConfigError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    merge_tables(doc, layer);
    Ok(())
}

/// Merge `layer` into `base`, recursing into sub-tables so sibling keys
/// from earlier layers survive.
fn merge_tables(base: &mut toml::Table, layer: toml::Table) {
    for (key, value) in layer {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn apply_env(config: &mut DriftConfig) -> Result<(), ConfigError> {
    if let Some(v) = env_var("DRIFT_MAX_FILE_SIZE") {
        config.scan.max_file_size_bytes = parse_env("DRIFT_MAX_FILE_SIZE", &v)?;
    }
    if let Some(v) = env_var("DRIFT_THREADS") {
        config.scan.threads = parse_env("DRIFT_THREADS", &v)?;
    }
    if let Some(v) = env_var("DRIFT_FORCE_FULL") {
        config.scan.force_full = parse_env("DRIFT_FORCE_FULL", &v)?;
    }
    if let Some(v) = env_var("DRIFT_DB_FILE") {
        config.storage.db_file = v;
    }
    if let Some(v) = env_var("DRIFT_READ_POOL_SIZE") {
        config.storage.read_pool_size = parse_env("DRIFT_READ_POOL_SIZE", &v)?;
    }
    if let Some(v) = env_var("DRIFT_RETENTION_DAYS") {
        config.storage.retention_days = parse_env("DRIFT_RETENTION_DAYS", &v)?;
    }
    Ok(())
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
        var: var.to_string(),
        value: value.to_string(),
        message: e.to_string(),
    })
}

fn apply_cli(config: &mut DriftConfig, cli: &CliOverrides) {
    if let Some(v) = cli.max_file_size_bytes {
        config.scan.max_file_size_bytes = v;
    }
    if let Some(v) = cli.threads {
        config.scan.threads = v;
    }
    if let Some(v) = cli.force_full {
        config.scan.force_full = v;
    }
    if let Some(ref v) = cli.db_file {
        config.storage.db_file = v.clone();
    }
}

fn validate(config: &DriftConfig) -> Result<(), ConfigError> {
    if config.scan.max_file_size_bytes == 0 {
        return Err(ConfigError::InvalidValue {
            key: "scan.max_file_size_bytes".to_string(),
            message: "must be positive".to_string(),
        });
    }
    if !(0.0..=1.0).contains(&config.analysis.fuzzy_similarity_threshold) {
        return Err(ConfigError::InvalidValue {
            key: "analysis.fuzzy_similarity_threshold".to_string(),
            message: "must be in [0, 1]".to_string(),
        });
    }
    if !(0.0..=1.0).contains(&config.learning.dominance_threshold) {
        return Err(ConfigError::InvalidValue {
            key: "learning.dominance_threshold".to_string(),
            message: "must be in [0, 1]".to_string(),
        });
    }
    if config.storage.max_batch_rows == 0 {
        return Err(ConfigError::InvalidValue {
            key: "storage.max_batch_rows".to_string(),
            message: "must be positive".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_no_files_present() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path(), &CliOverrides::default()).unwrap();
        assert_eq!(config.scan.max_file_size_bytes, 1024 * 1024);
        assert_eq!(config.storage.db_file, "drift.db");
        assert_eq!(config.learning.min_occurrences, 3);
    }

    #[test]
    fn project_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("drift.toml"),
            "[scan]\nmax_file_size_bytes = 2048\n",
        )
        .unwrap();
        let config = load_config(dir.path(), &CliOverrides::default()).unwrap();
        assert_eq!(config.scan.max_file_size_bytes, 2048);
        // Sibling keys keep their defaults.
        assert_eq!(config.scan.ignore_file, ".driftignore");
    }

    #[test]
    fn cli_overrides_project_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("drift.toml"),
            "[scan]\nmax_file_size_bytes = 2048\n",
        )
        .unwrap();
        let cli = CliOverrides {
            max_file_size_bytes: Some(4096),
            ..Default::default()
        };
        let config = load_config(dir.path(), &cli).unwrap();
        assert_eq!(config.scan.max_file_size_bytes, 4096);
    }

    #[test]
    fn unknown_key_in_section_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("drift.toml"), "[scan]\nno_such_key = 1\n").unwrap();
        let err = load_config(dir.path(), &CliOverrides::default());
        assert!(err.is_err());
    }

    #[test]
    fn zero_file_cap_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("drift.toml"),
            "[scan]\nmax_file_size_bytes = 0\n",
        )
        .unwrap();
        assert!(load_config(dir.path(), &CliOverrides::default()).is_err());
    }
}
