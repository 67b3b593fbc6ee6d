//! YAML configuration for a binary built on this crate.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Worker pool size used when neither a named pipeline nor a `"default"`
/// entry appears in `worker_pool_size`.
const FALLBACK_WORKER_POOL_SIZE: usize = 4;

/// Top-level configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    /// Worker pool size per pipeline name, e.g. `archive-encrypt: 8`. A
    /// `"default"` entry applies to any pipeline not listed by name.
    pub worker_pool_size: HashMap<String, usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            worker_pool_size: HashMap::new(),
        }
    }
}

impl Config {
    /// The worker pool size to use for `pipeline`: its own entry, then
    /// `"default"`, then [`FALLBACK_WORKER_POOL_SIZE`].
    pub fn worker_pool_size(&self, pipeline: Option<&str>) -> usize {
        pipeline
            .and_then(|name| self.worker_pool_size.get(name))
            .or_else(|| self.worker_pool_size.get("default"))
            .copied()
            .unwrap_or(FALLBACK_WORKER_POOL_SIZE)
    }
}

/// How `format` in the `tracing-subscriber` output layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable, multi-line, colored.
    Pretty,
    /// Single-line, uncolored.
    Compact,
    /// One JSON object per event.
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive string, e.g. `"info"` or `"backup_machines=debug"`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Errors that can occur while loading a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl Config {
    /// Loads configuration from a YAML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.worker_pool_size(None), 4);
        assert_eq!(config.worker_pool_size(Some("archive-encrypt")), 4);
    }

    #[test]
    fn loads_partial_yaml_with_defaults_filled_in() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "worker_pool_size:\n  archive-encrypt: 8\n  default: 2\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.worker_pool_size(Some("archive-encrypt")), 8);
        assert_eq!(config.worker_pool_size(Some("other-pipeline")), 2);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::load("/nonexistent/path/config.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
