//! Default-threshold store.
//!
//! The store is a flat key/value table owned by the automation that calls
//! the view. It is loaded once (from a JSON file, the environment, or the
//! built-in table) and never changes afterward. A key missing from the store
//! is meaningful: a check that needs it, and gets it from nowhere else,
//! fails with [`Error::MissingThreshold`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::constants::*;
use crate::utils::math::as_number;

/// Prefix for environment overrides (`HEALTHCHECK_CPU_WARNING_THRESHOLD`, ...)
pub const ENV_PREFIX: &str = "HEALTHCHECK_";

// ═══════════════════════════════════════════════════════════════════════════════
// THRESHOLD KEYS
// ═══════════════════════════════════════════════════════════════════════════════

/// Keys the evaluator looks up in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdKey {
    /// CPU utilization warning tier
    CpuWarningThreshold,
    /// CPU utilization critical tier
    CpuCriticalThreshold,
    /// Memory utilization ceiling
    MemoryUtilizationThreshold,
    /// Minimum free memory
    MemoryFreeThreshold,
    /// Minimum buffer memory
    MemoryBuffersThreshold,
    /// Minimum cache memory
    MemoryCacheThreshold,
    /// Minimum filesystem free percentage
    FilesystemFreeThreshold,
    /// Maximum environment temperature
    EnvironmentTempThreshold,
}

impl ThresholdKey {
    /// All keys
    pub fn all() -> &'static [ThresholdKey] {
        &[
            ThresholdKey::CpuWarningThreshold,
            ThresholdKey::CpuCriticalThreshold,
            ThresholdKey::MemoryUtilizationThreshold,
            ThresholdKey::MemoryFreeThreshold,
            ThresholdKey::MemoryBuffersThreshold,
            ThresholdKey::MemoryCacheThreshold,
            ThresholdKey::FilesystemFreeThreshold,
            ThresholdKey::EnvironmentTempThreshold,
        ]
    }

    /// Key as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdKey::CpuWarningThreshold => "cpu_warning_threshold",
            ThresholdKey::CpuCriticalThreshold => "cpu_critical_threshold",
            ThresholdKey::MemoryUtilizationThreshold => "memory_utilization_threshold",
            ThresholdKey::MemoryFreeThreshold => "memory_free_threshold",
            ThresholdKey::MemoryBuffersThreshold => "memory_buffers_threshold",
            ThresholdKey::MemoryCacheThreshold => "memory_cache_threshold",
            ThresholdKey::FilesystemFreeThreshold => "filesystem_free_threshold",
            ThresholdKey::EnvironmentTempThreshold => "environment_temp_threshold",
        }
    }

    /// Built-in value, if the key has one
    pub fn builtin(&self) -> Option<f64> {
        match self {
            ThresholdKey::CpuWarningThreshold => Some(BUILTIN_CPU_WARNING),
            ThresholdKey::CpuCriticalThreshold => Some(BUILTIN_CPU_CRITICAL),
            ThresholdKey::MemoryUtilizationThreshold => Some(BUILTIN_MEMORY_UTILIZATION),
            ThresholdKey::MemoryFreeThreshold => Some(BUILTIN_MEMORY_FREE_MB),
            ThresholdKey::MemoryBuffersThreshold => Some(BUILTIN_MEMORY_BUFFERS_MB),
            ThresholdKey::MemoryCacheThreshold => Some(BUILTIN_MEMORY_CACHE_MB),
            ThresholdKey::FilesystemFreeThreshold | ThresholdKey::EnvironmentTempThreshold => None,
        }
    }

    /// Environment variable that overrides this key
    pub fn env_var(&self) -> String {
        format!("{}{}", ENV_PREFIX, self.as_str().to_ascii_uppercase())
    }
}

impl std::fmt::Display for ThresholdKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// THRESHOLD DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Read-only key/value table of default thresholds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdDefaults {
    values: BTreeMap<String, f64>,
}

impl ThresholdDefaults {
    /// Empty store: every threshold must come from the check or the facts
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in table (CPU tiers and memory minimums; no filesystem or
    /// temperature default)
    pub fn builtin() -> Self {
        let values = ThresholdKey::all()
            .iter()
            .filter_map(|key| key.builtin().map(|v| (key.as_str().to_string(), v)))
            .collect();
        Self { values }
    }

    /// Set a value
    pub fn with(mut self, key: ThresholdKey, value: f64) -> Self {
        self.values.insert(key.as_str().to_string(), value);
        self
    }

    /// Remove a value
    pub fn without(mut self, key: ThresholdKey) -> Self {
        self.values.remove(key.as_str());
        self
    }

    /// Look up a key
    pub fn get(&self, key: ThresholdKey) -> Option<f64> {
        self.values.get(key.as_str()).copied()
    }

    /// Iterate over all stored pairs, sorted by key
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build from a JSON object of key → number (numeric strings accepted)
    pub fn from_json_map(map: &Map<String, Value>) -> Result<Self> {
        let mut values = BTreeMap::new();
        for (key, value) in map {
            let number = as_number(value).ok_or_else(|| {
                Error::Config(format!("default threshold '{}' is not numeric: {}", key, value))
            })?;
            values.insert(key.clone(), number);
        }
        Ok(Self { values })
    }

    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(map) => Self::from_json_map(&map),
            _ => Err(Error::Config("default thresholds must be a JSON object".into())),
        }
    }

    /// Load from file; the file replaces the built-in table entirely
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("{}: {}", path.display(), e)))?;
        let defaults = Self::from_json(&content)?;
        defaults.validate()?;
        tracing::info!(path = %path.display(), keys = defaults.len(), "loaded default thresholds");
        Ok(defaults)
    }

    /// Apply `HEALTHCHECK_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in ThresholdKey::all() {
            let var = key.env_var();
            if let Some(raw) = lookup(&var) {
                let value = as_number(&Value::String(raw.clone())).ok_or_else(|| {
                    Error::Config(format!("{} is not numeric: {}", var, raw))
                })?;
                self.values.insert(key.as_str().to_string(), value);
            }
        }
        Ok(self)
    }

    /// Built-in table with environment overrides applied
    pub fn from_env() -> Result<Self> {
        Self::builtin().with_env_overrides()
    }

    /// Overlay another store on top of this one
    pub fn merge(mut self, other: &ThresholdDefaults) -> Self {
        for (key, value) in other.iter() {
            self.values.insert(key.to_string(), value);
        }
        self
    }

    /// Validate values are usable
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "default threshold '{}' must be a non-negative number, got {}",
                    key, value
                )));
            }
        }

        if let (Some(warning), Some(critical)) = (
            self.get(ThresholdKey::CpuWarningThreshold),
            self.get(ThresholdKey::CpuCriticalThreshold),
        ) {
            if warning >= critical {
                return Err(Error::Config(format!(
                    "cpu_warning_threshold ({}) must be below cpu_critical_threshold ({})",
                    warning, critical
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_builtin_table() {
        let defaults = ThresholdDefaults::builtin();
        assert_eq!(defaults.get(ThresholdKey::CpuWarningThreshold), Some(85.0));
        assert_eq!(defaults.get(ThresholdKey::CpuCriticalThreshold), Some(95.0));
        assert_eq!(defaults.get(ThresholdKey::MemoryFreeThreshold), Some(100.0));
        assert_eq!(defaults.get(ThresholdKey::FilesystemFreeThreshold), None);
        assert_eq!(defaults.get(ThresholdKey::EnvironmentTempThreshold), None);
        assert!(defaults.validate().is_ok());
    }

    #[test]
    fn test_env_var_names() {
        assert_eq!(
            ThresholdKey::FilesystemFreeThreshold.env_var(),
            "HEALTHCHECK_FILESYSTEM_FREE_THRESHOLD"
        );
    }

    #[test]
    fn test_from_json_accepts_numeric_strings() {
        let defaults = ThresholdDefaults::from_json(
            r#"{"filesystem_free_threshold": "10", "environment_temp_threshold": 70}"#,
        )
        .unwrap();
        assert_eq!(defaults.get(ThresholdKey::FilesystemFreeThreshold), Some(10.0));
        assert_eq!(defaults.get(ThresholdKey::EnvironmentTempThreshold), Some(70.0));
        assert_eq!(defaults.get(ThresholdKey::CpuWarningThreshold), None);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(matches!(
            ThresholdDefaults::from_json(r#"{"cpu_warning_threshold": "high"}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(ThresholdDefaults::from_json("[1]"), Err(Error::Config(_))));
        assert!(matches!(
            ThresholdDefaults::from_json("{"),
            Err(Error::Deserialization(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", json!({"cpu_warning_threshold": 70, "cpu_critical_threshold": 90})).unwrap();

        let defaults = ThresholdDefaults::load(file.path()).unwrap();
        assert_eq!(defaults.len(), 2);
        assert_eq!(defaults.get(ThresholdKey::CpuWarningThreshold), Some(70.0));
        assert_eq!(defaults.get(ThresholdKey::MemoryFreeThreshold), None);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ThresholdDefaults::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_validate_cpu_tiers() {
        let defaults = ThresholdDefaults::builtin().with(ThresholdKey::CpuWarningThreshold, 96.0);
        assert!(matches!(defaults.validate(), Err(Error::Config(_))));

        let defaults = ThresholdDefaults::empty().with(ThresholdKey::MemoryFreeThreshold, -1.0);
        assert!(defaults.validate().is_err());
    }

    #[test]
    fn test_overrides_from_lookup() {
        let defaults = ThresholdDefaults::builtin()
            .with_overrides_from(|name| match name {
                "HEALTHCHECK_ENVIRONMENT_TEMP_THRESHOLD" => Some("65".into()),
                "HEALTHCHECK_CPU_WARNING_THRESHOLD" => Some("80%".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(defaults.get(ThresholdKey::EnvironmentTempThreshold), Some(65.0));
        assert_eq!(defaults.get(ThresholdKey::CpuWarningThreshold), Some(80.0));

        let bad = ThresholdDefaults::empty().with_overrides_from(|name| {
            (name == "HEALTHCHECK_CPU_CRITICAL_THRESHOLD").then(|| "lots".to_string())
        });
        assert!(bad.is_err());
    }

    #[test]
    fn test_merge_and_without() {
        let overlay = ThresholdDefaults::empty().with(ThresholdKey::FilesystemFreeThreshold, 12.0);
        let merged = ThresholdDefaults::builtin()
            .merge(&overlay)
            .without(ThresholdKey::MemoryCacheThreshold);
        assert_eq!(merged.get(ThresholdKey::FilesystemFreeThreshold), Some(12.0));
        assert_eq!(merged.get(ThresholdKey::MemoryCacheThreshold), None);
        assert_eq!(merged.get(ThresholdKey::CpuCriticalThreshold), Some(95.0));
    }
}
