//! Crash file normalization.

use serde::Serialize;
use serde_json::Value;

use crate::facts::RawFacts;

/// Known crash file locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrashShape {
    /// `crash_files`
    CrashFiles,
    /// `crash_health.crash_files`
    CrashHealth,
    /// No recognized section
    Absent,
}

/// Canonical crash file listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrashMetric {
    /// Location the listing came from
    pub shape: CrashShape,
    /// Crash file names, stringified when a collector reports records
    pub files: Vec<String>,
}

impl CrashMetric {
    /// Number of crash files
    pub fn count(&self) -> usize {
        self.files.len()
    }
}

/// Normalize crash file facts
pub fn normalize(facts: &RawFacts) -> CrashMetric {
    let (shape, entries) = if let Some(files) = facts.sequence("crash_files") {
        (CrashShape::CrashFiles, files.as_slice())
    } else if let Some(files) = facts
        .mapping("crash_health")
        .and_then(|health| health.get("crash_files"))
        .and_then(Value::as_array)
    {
        (CrashShape::CrashHealth, files.as_slice())
    } else {
        let nested_listing = facts
            .mapping("crash_health")
            .is_some_and(|health| health.contains_key("crash_files"));
        if facts.contains("crash_files") || nested_listing {
            tracing::warn!("crash file listing is not a sequence, treating as empty");
        }
        (CrashShape::Absent, &[][..])
    };

    let files = entries
        .iter()
        .map(|entry| match entry {
            Value::String(name) => name.clone(),
            other => other.to_string(),
        })
        .collect();

    CrashMetric { shape, files }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn facts(value: Value) -> RawFacts {
        RawFacts::from_value(value).unwrap()
    }

    #[test]
    fn test_crash_files_sequence() {
        let metric = normalize(&facts(json!({"crash_files": ["core1", "core2"]})));
        assert_eq!(metric.shape, CrashShape::CrashFiles);
        assert_eq!(metric.count(), 2);
        assert_eq!(metric.files, vec!["core1", "core2"]);
    }

    #[test]
    fn test_crash_health_location() {
        let metric = normalize(&facts(json!({
            "crash_health": {"crash_files": [{"name": "kernel.core"}]}
        })));
        assert_eq!(metric.shape, CrashShape::CrashHealth);
        assert_eq!(metric.count(), 1);
        assert!(metric.files[0].contains("kernel.core"));
    }

    #[test]
    fn test_absent_or_malformed() {
        assert_eq!(normalize(&facts(json!({}))).count(), 0);

        let metric = normalize(&facts(json!({"crash_files": "none"})));
        assert_eq!(metric.shape, CrashShape::Absent);
        assert_eq!(metric.count(), 0);
    }
}
