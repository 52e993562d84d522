//! # Application Configuration
//!
//! Optional TOML file with a `[graph]` and a `[log]` table:
//!
//! ```toml
//! [graph]
//! directory = "/var/lib/propgraph"
//! snapshot_file = "graph.dat"
//!
//! [log]
//! format = "json"
//! filter = "propgraph=debug"
//! ```
//!
//! Missing tables and fields fall back to defaults. Command-line flags and
//! `PROPGRAPH_LOG_FORMAT` take precedence over the file.

use crate::AppError;
use propgraph_core::GraphConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `log.format`.
pub const LOG_FORMAT_ENV: &str = "PROPGRAPH_LOG_FORMAT";

/// Directory used when neither `--dir` nor `graph.directory` is set.
pub const DEFAULT_DIRECTORY: &str = "propgraph-data";

/// Largest config file accepted.
const MAX_CONFIG_SIZE: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Parse an override value. Unknown values fall back to text.
    #[must_use]
    pub fn from_env_value(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            filter: "propgraph=info,propgraph_core=info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub graph: GraphConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Load from `path`, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let metadata = std::fs::metadata(path).map_err(|e| {
            AppError::Config(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_SIZE {
            return Err(AppError::Config(format!(
                "'{}' is {} bytes, maximum is {}",
                path.display(),
                metadata.len(),
                MAX_CONFIG_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, AppError> {
        toml::from_str(text).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Apply `PROPGRAPH_LOG_FORMAT`, if set.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(format) = std::env::var(LOG_FORMAT_ENV) {
            self.log.format = LogFormat::from_env_value(&format);
        }
        self
    }

    /// Storage config for a command: `--dir` wins over `graph.directory`.
    #[must_use]
    pub fn graph_config(&self, dir: Option<&Path>) -> GraphConfig {
        let directory = dir
            .map(Path::to_path_buf)
            .or_else(|| self.graph.directory.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DIRECTORY));
        GraphConfig {
            directory: Some(directory),
            snapshot_file: self.graph.snapshot_file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = AppConfig::from_toml("").expect("parse");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.graph.snapshot_file, "graph.dat");
    }

    #[test]
    fn partial_tables_keep_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [graph]
            directory = "/tmp/g"

            [log]
            format = "json"
            "#,
        )
        .expect("parse");

        assert_eq!(config.graph.directory, Some(PathBuf::from("/tmp/g")));
        assert_eq!(config.graph.snapshot_file, "graph.dat");
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.filter, LogConfig::default().filter);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let result = AppConfig::from_toml("[log]\nformat = \"yaml\"\n");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn dir_flag_wins_over_file() {
        let config = AppConfig::from_toml("[graph]\ndirectory = \"from-file\"\n").expect("parse");

        let flagged = config.graph_config(Some(Path::new("from-flag")));
        assert_eq!(flagged.directory, Some(PathBuf::from("from-flag")));

        let unflagged = config.graph_config(None);
        assert_eq!(unflagged.directory, Some(PathBuf::from("from-file")));

        let fallback = AppConfig::default().graph_config(None);
        assert_eq!(fallback.directory, Some(PathBuf::from(DEFAULT_DIRECTORY)));
    }

    #[test]
    fn env_value_parsing() {
        assert_eq!(LogFormat::from_env_value("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_env_value("text"), LogFormat::Text);
        assert_eq!(LogFormat::from_env_value("other"), LogFormat::Text);
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = AppConfig::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(AppError::Config(_))));
        assert_eq!(AppConfig::load(None).expect("defaults"), AppConfig::default());
    }
}
