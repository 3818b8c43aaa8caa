//! Environment-driven configuration.
//!
//! # Responsibility
//! - Resolve database path, logging settings and hash cost from env vars.
//!
//! # Invariants
//! - Unset variables fall back to defaults; malformed ones are errors.

use crate::auth::password::HashConfig;
use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "FJMA_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "FJMA_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FJMA_LOG_DIR";
pub const ENV_HASH_MEMORY_KIB: &str = "FJMA_HASH_MEMORY_KIB";
pub const ENV_HASH_ITERATIONS: &str = "FJMA_HASH_ITERATIONS";
pub const ENV_HASH_PARALLELISM: &str = "FJMA_HASH_PARALLELISM";

const DEFAULT_DB_FILE_NAME: &str = "fjma_system.db";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid value `{}` for {}; expected a positive integer",
            self.value, self.key
        )
    }
}

impl Error for ConfigError {}

/// Runtime settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute log directory; file logging is off when `None`.
    pub log_dir: Option<String>,
    pub hash: HashConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            hash: HashConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let hash = HashConfig {
            memory_kib: parse_u32(&lookup, ENV_HASH_MEMORY_KIB)?
                .unwrap_or(defaults.hash.memory_kib),
            iterations: parse_u32(&lookup, ENV_HASH_ITERATIONS)?
                .unwrap_or(defaults.hash.iterations),
            parallelism: parse_u32(&lookup, ENV_HASH_PARALLELISM)?
                .unwrap_or(defaults.hash.parallelism),
        };

        Ok(Self {
            db_path: non_empty(&lookup, ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            log_level: non_empty(&lookup, ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: non_empty(&lookup, ENV_LOG_DIR),
            hash,
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn parse_u32<F>(lookup: &F, key: &'static str) -> Result<Option<u32>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = non_empty(lookup, key) else {
        return Ok(None);
    };
    match value.trim().parse::<u32>() {
        Ok(parsed) if parsed > 0 => Ok(Some(parsed)),
        _ => Err(ConfigError { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, ENV_DB_PATH, ENV_HASH_ITERATIONS, ENV_LOG_DIR};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = CoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.db_path, PathBuf::from("fjma_system.db"));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = CoreConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/tmp/records.db"),
            (ENV_LOG_DIR, "/tmp/fjma-logs"),
            (ENV_HASH_ITERATIONS, "4"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/records.db"));
        assert_eq!(config.log_dir.as_deref(), Some("/tmp/fjma-logs"));
        assert_eq!(config.hash.iterations, 4);
    }

    #[test]
    fn malformed_number_is_rejected() {
        let err = CoreConfig::from_lookup(lookup(&[(ENV_HASH_ITERATIONS, "lots")])).unwrap_err();
        assert_eq!(err.key, ENV_HASH_ITERATIONS);
        assert!(err.to_string().contains("lots"));
    }
}
