//! Configuration for elasticmodel tooling
//!
//! Default config location: ./elastic.toml

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
    /// Directory scanned for `*.yaml` schema files
    #[serde(default = "default_schemas_dir")]
    pub schemas_dir: PathBuf,
}

fn default_schemas_dir() -> PathBuf {
    PathBuf::from("./schemas")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            mapping: MappingConfig::default(),
            schemas_dir: default_schemas_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MappingConfig {
    /// Inference flag for loaded fields that do not declare one
    #[serde(default = "default_true")]
    pub inference_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            inference_enabled: true,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if it exists, fall back to defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert!(config.mapping.inference_enabled);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("elastic.toml");
        fs::write(
            &path,
            r#"
schemas_dir = "/srv/schemas"

[mapping]
inference_enabled = false
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.schemas_dir, PathBuf::from("/srv/schemas"));
        assert!(!config.mapping.inference_enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp = tempdir().unwrap();
        let config = Config::load_or_default(temp.path().join("nope.toml")).unwrap();
        assert_eq!(config.schemas_dir, PathBuf::from("./schemas"));
    }
}
