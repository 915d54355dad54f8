//! CLI Configuration.
//!
//! Persistent preferences for the `healthcheck` tool.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::output::OutputFormat;
use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// CLI CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// CLI Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Output format when `--format` is not given
    pub format: OutputFormat,
    /// Default-threshold file when `--defaults` is not given
    pub defaults_path: Option<PathBuf>,
    /// Colored text output
    pub color: bool,
    /// Exit with status 2 when the overall result is FAIL
    pub fail_on_error: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            defaults_path: None,
            color: true,
            fail_on_error: false,
        }
    }
}

impl CliConfig {
    /// Load from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("{}: {}", path.display(), e)))?;

        serde_json::from_str(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load from file if it exists, otherwise defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::Io(e.to_string()))?;
        }

        std::fs::write(path, content).map_err(|e| Error::Io(e.to_string()))
    }

    /// Apply `HEALTHCHECK_FORMAT`, `HEALTHCHECK_DEFAULTS` and `NO_COLOR`
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(format) = std::env::var("HEALTHCHECK_FORMAT") {
            match format.parse() {
                Ok(format) => self.format = format,
                Err(e) => tracing::warn!(%format, error = %e, "ignoring HEALTHCHECK_FORMAT"),
            }
        }

        if let Ok(path) = std::env::var("HEALTHCHECK_DEFAULTS") {
            self.defaults_path = Some(PathBuf::from(path));
        }

        if std::env::var_os("NO_COLOR").is_some() {
            self.color = false;
        }

        self
    }

    /// Default config file path
    pub fn default_path() -> PathBuf {
        default_config_dir().join("config.json")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.defaults_path {
            if path.as_os_str().is_empty() {
                return Err(Error::Config("defaults_path cannot be empty".into()));
            }
        }
        Ok(())
    }
}

/// Configuration directory
fn default_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(dir).join("healthcheck");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config/healthcheck");
    }

    PathBuf::from(".healthcheck")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CliConfig::default();
        assert_eq!(config.format, OutputFormat::Text);
        assert!(config.color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.json");

        let config = CliConfig {
            format: OutputFormat::JsonPretty,
            defaults_path: Some(PathBuf::from("/etc/healthcheck/defaults.json")),
            color: false,
            fail_on_error: true,
        };
        config.save(&path).unwrap();

        assert_eq!(CliConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"format": "json"}"#).unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.color);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_validation() {
        let config = CliConfig {
            defaults_path: Some(PathBuf::new()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
