//! Shell configuration
//!
//! An optional JSON file; every field has a default:
//!
//! ```json
//! {"storage_path": "storage.json", "prompt": "(hbnb) ", "log_level": "warn"}
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::console::DEFAULT_PROMPT;
use crate::observability::Severity;
use crate::storage::DEFAULT_STORAGE_PATH;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backing JSON file (optional, default "storage.json")
    #[serde(default = "default_storage_path")]
    pub storage_path: String,

    /// Prompt literal (optional, default "(hbnb) ")
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Minimum log severity on stderr (optional, default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_storage_path() -> String {
    DEFAULT_STORAGE_PATH.to_string()
}
fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            prompt: default_prompt(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load the file if given, else use defaults
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        if self.storage_path.trim().is_empty() {
            return Err(CliError::config_error("storage_path must not be empty"));
        }

        if Severity::parse(&self.log_level).is_none() {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'. Must be one of trace, info, warn, error, fatal.",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Get the storage file as a path
    pub fn storage_file(&self) -> PathBuf {
        PathBuf::from(&self.storage_path)
    }

    /// Configured log threshold
    pub fn severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Warn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_config(temp_dir: &TempDir, value: serde_json::Value) -> PathBuf {
        let path = temp_dir.path().join("modelshell.json");
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[test]
    fn test_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, json!({}));

        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.storage_path, "storage.json");
        assert_eq!(config.prompt, "(hbnb) ");
        assert_eq!(config.severity(), Severity::Warn);
    }

    #[test]
    fn test_config_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            json!({"storage_path": "/tmp/file.json", "prompt": "> ", "log_level": "INFO"}),
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.storage_file(), PathBuf::from("/tmp/file.json"));
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.severity(), Severity::Info);
    }

    #[test]
    fn test_config_validates_log_level() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, json!({"log_level": "loud"}));
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_config_rejects_empty_storage_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, json!({"storage_path": " "}));
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load(&temp_dir.path().join("absent.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_no_config_path_uses_defaults() {
        assert_eq!(Config::load_or_default(None).unwrap(), Config::default());
    }
}
