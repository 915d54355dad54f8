//! Check specifications and the closed set of recognized checks.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::normalize::MetricFamily;
use crate::utils::math::as_number;

// ═══════════════════════════════════════════════════════════════════════════════
// CHECK KIND
// ═══════════════════════════════════════════════════════════════════════════════

/// Recognized checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// CPU utilization, two-tier with `threshold`, three-tier otherwise
    CpuUtilization,
    /// CPU figures, no verdict
    CpuStatusSummary,
    /// Memory utilization ≤ threshold
    MemoryUtilization,
    /// Memory figures, no verdict
    MemoryStatusSummary,
    /// Free memory ≥ min_free
    MemoryFree,
    /// Buffer memory ≥ min_buffers
    MemoryBuffers,
    /// Cache memory ≥ min_cache
    MemoryCache,
    /// Uptime ≥ min_uptime
    Uptime,
    /// Uptime figures, no verdict
    UptimeStatusSummary,
    /// Crash file count ≤ max_count
    CrashFiles,
    /// Crash file listing, no verdict
    CrashFilesSummary,
    /// Filesystem used percent ≤ threshold
    FilesystemUtilization,
    /// Filesystem free percent ≥ threshold
    FilesystemFree,
    /// Temperature, fans and power together
    EnvironmentStatus,
    /// BGP neighbors up ≥ min_count
    MinNeighborsUp,
    /// Every BGP neighbor up
    AllNeighborsUp,
    /// Every BGP neighbor down
    AllNeighborsDown,
    /// BGP neighbor table, no verdict
    BgpStatusSummary,
    /// OSPF neighbors in Full ≥ min_count
    OspfNeighbors,
}

impl CheckKind {
    /// All kinds
    pub fn all() -> &'static [CheckKind] {
        &[
            CheckKind::CpuUtilization,
            CheckKind::CpuStatusSummary,
            CheckKind::MemoryUtilization,
            CheckKind::MemoryStatusSummary,
            CheckKind::MemoryFree,
            CheckKind::MemoryBuffers,
            CheckKind::MemoryCache,
            CheckKind::Uptime,
            CheckKind::UptimeStatusSummary,
            CheckKind::CrashFiles,
            CheckKind::CrashFilesSummary,
            CheckKind::FilesystemUtilization,
            CheckKind::FilesystemFree,
            CheckKind::EnvironmentStatus,
            CheckKind::MinNeighborsUp,
            CheckKind::AllNeighborsUp,
            CheckKind::AllNeighborsDown,
            CheckKind::BgpStatusSummary,
            CheckKind::OspfNeighbors,
        ]
    }

    /// Canonical check name
    pub fn name(&self) -> &'static str {
        match self {
            CheckKind::CpuUtilization => "cpu_utilization",
            CheckKind::CpuStatusSummary => "cpu_status_summary",
            CheckKind::MemoryUtilization => "memory_utilization",
            CheckKind::MemoryStatusSummary => "memory_status_summary",
            CheckKind::MemoryFree => "memory_free",
            CheckKind::MemoryBuffers => "memory_buffers",
            CheckKind::MemoryCache => "memory_cache",
            CheckKind::Uptime => "uptime",
            CheckKind::UptimeStatusSummary => "uptime_status_summary",
            CheckKind::CrashFiles => "crash_files",
            CheckKind::CrashFilesSummary => "crash_files_summary",
            CheckKind::FilesystemUtilization => "filesystem_utilization",
            CheckKind::FilesystemFree => "filesystem_status_summary",
            CheckKind::EnvironmentStatus => "environment_status",
            CheckKind::MinNeighborsUp => "min_neighbors_up",
            CheckKind::AllNeighborsUp => "all_neighbors_up",
            CheckKind::AllNeighborsDown => "all_neighbors_down",
            CheckKind::BgpStatusSummary => "bgp_status_summary",
            CheckKind::OspfNeighbors => "ospf_neighbors",
        }
    }

    /// Resolve a check name; unknown names yield `None`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "filesystem_free" => Some(CheckKind::FilesystemFree),
            _ => Self::all().iter().copied().find(|kind| kind.name() == name),
        }
    }

    /// Metric family the check reads
    pub fn family(&self) -> MetricFamily {
        match self {
            CheckKind::CpuUtilization | CheckKind::CpuStatusSummary => MetricFamily::Cpu,
            CheckKind::MemoryUtilization
            | CheckKind::MemoryStatusSummary
            | CheckKind::MemoryFree
            | CheckKind::MemoryBuffers
            | CheckKind::MemoryCache => MetricFamily::Memory,
            CheckKind::Uptime | CheckKind::UptimeStatusSummary => MetricFamily::Uptime,
            CheckKind::CrashFiles | CheckKind::CrashFilesSummary => MetricFamily::CrashFiles,
            CheckKind::FilesystemUtilization | CheckKind::FilesystemFree => MetricFamily::Filesystem,
            CheckKind::EnvironmentStatus => MetricFamily::Environment,
            CheckKind::MinNeighborsUp
            | CheckKind::AllNeighborsUp
            | CheckKind::AllNeighborsDown
            | CheckKind::BgpStatusSummary => MetricFamily::Bgp,
            CheckKind::OspfNeighbors => MetricFamily::Ospf,
        }
    }

    /// Whether the check only reports data
    pub fn is_summary(&self) -> bool {
        matches!(
            self,
            CheckKind::CpuStatusSummary
                | CheckKind::MemoryStatusSummary
                | CheckKind::UptimeStatusSummary
                | CheckKind::CrashFilesSummary
                | CheckKind::BgpStatusSummary
        )
    }

    /// Whether the verdict feeds the overall status even with `ignore_errors`
    pub fn always_contributes(&self) -> bool {
        matches!(self, CheckKind::EnvironmentStatus)
    }

    /// Whether the check has a WARNING tier
    pub fn has_warning_tier(&self) -> bool {
        matches!(self, CheckKind::CpuUtilization)
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHECK SPEC
// ═══════════════════════════════════════════════════════════════════════════════

/// One requested check, as authored in the check list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckSpec {
    /// Check name; also the key of its entry in the report
    pub name: String,

    /// Utilization ceiling (percent)
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,

    /// Minimum neighbors up
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub min_count: Option<f64>,

    /// Minimum free memory (MB)
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub min_free: Option<f64>,

    /// Minimum buffer memory (MB)
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub min_buffers: Option<f64>,

    /// Minimum cache memory (MB)
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub min_cache: Option<f64>,

    /// Maximum crash files
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub max_count: Option<f64>,

    /// Minimum uptime (minutes)
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub min_uptime: Option<f64>,

    /// CPU warning tier
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub warning_threshold: Option<f64>,

    /// CPU critical tier
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub critical_threshold: Option<f64>,

    /// Minimum filesystem free percentage
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub filesystem_free_threshold: Option<f64>,

    /// Maximum temperature
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub temp_threshold: Option<f64>,

    /// Keep the verdict out of the overall status
    #[serde(default, deserialize_with = "lenient_bool")]
    pub ignore_errors: bool,

    /// Attach the canonical metric to the result
    #[serde(default, deserialize_with = "lenient_bool")]
    pub details: bool,
}

impl CheckSpec {
    /// Check with only a name set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Recognized kind, if any
    pub fn kind(&self) -> Option<CheckKind> {
        CheckKind::from_name(&self.name)
    }

    /// Set `threshold`
    pub fn with_threshold(mut self, value: f64) -> Self {
        self.threshold = Some(value);
        self
    }

    /// Set `min_count`
    pub fn with_min_count(mut self, value: f64) -> Self {
        self.min_count = Some(value);
        self
    }

    /// Set `min_free`
    pub fn with_min_free(mut self, value: f64) -> Self {
        self.min_free = Some(value);
        self
    }

    /// Set `min_buffers`
    pub fn with_min_buffers(mut self, value: f64) -> Self {
        self.min_buffers = Some(value);
        self
    }

    /// Set `min_cache`
    pub fn with_min_cache(mut self, value: f64) -> Self {
        self.min_cache = Some(value);
        self
    }

    /// Set `max_count`
    pub fn with_max_count(mut self, value: f64) -> Self {
        self.max_count = Some(value);
        self
    }

    /// Set `min_uptime`
    pub fn with_min_uptime(mut self, value: f64) -> Self {
        self.min_uptime = Some(value);
        self
    }

    /// Set the CPU warning and critical tiers
    pub fn with_cpu_tiers(mut self, warning: f64, critical: f64) -> Self {
        self.warning_threshold = Some(warning);
        self.critical_threshold = Some(critical);
        self
    }

    /// Set `filesystem_free_threshold`
    pub fn with_filesystem_free_threshold(mut self, value: f64) -> Self {
        self.filesystem_free_threshold = Some(value);
        self
    }

    /// Set `temp_threshold`
    pub fn with_temp_threshold(mut self, value: f64) -> Self {
        self.temp_threshold = Some(value);
        self
    }

    /// Set `ignore_errors`
    pub fn with_ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = ignore;
        self
    }

    /// Set `details`
    pub fn with_details(mut self, details: bool) -> Self {
        self.details = details;
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LENIENT FIELDS
// ═══════════════════════════════════════════════════════════════════════════════

// Check lists are usually rendered from templates, so numbers and booleans
// often arrive as strings.

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => as_number(&value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("expected a number, got {}", value))),
    }
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None => Ok(false),
        Some(value) => as_flag(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("expected a boolean, got {}", value))),
    }
}

/// Read a boolean the way templated input spells it (`yes`, `"true"`, `1`, ...)
pub(crate) fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Null => Some(false),
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in CheckKind::all() {
            assert_eq!(CheckKind::from_name(kind.name()), Some(*kind));
        }
        assert_eq!(CheckKind::from_name("filesystem_free"), Some(CheckKind::FilesystemFree));
        assert_eq!(CheckKind::from_name("interface_errors"), None);
    }

    #[test]
    fn test_only_cpu_has_warning_tier() {
        let tiered: Vec<_> = CheckKind::all().iter().filter(|k| k.has_warning_tier()).collect();
        assert_eq!(tiered, vec![&CheckKind::CpuUtilization]);
    }

    #[test]
    fn test_deserialize_spec() {
        let spec: CheckSpec = serde_json::from_value(json!({
            "name": "memory_free",
            "min_free": 100,
            "ignore_errors": true
        }))
        .unwrap();

        assert_eq!(spec.kind(), Some(CheckKind::MemoryFree));
        assert_eq!(spec.min_free, Some(100.0));
        assert!(spec.ignore_errors);
        assert!(!spec.details);
        assert_eq!(spec.threshold, None);
    }

    #[test]
    fn test_deserialize_templated_values() {
        let spec: CheckSpec = serde_json::from_value(json!({
            "name": "cpu_utilization",
            "threshold": "80",
            "ignore_errors": "yes",
            "details": "False",
            "min_count": null
        }))
        .unwrap();

        assert_eq!(spec.threshold, Some(80.0));
        assert!(spec.ignore_errors);
        assert!(!spec.details);
        assert_eq!(spec.min_count, None);
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        let result = serde_json::from_value::<CheckSpec>(json!({
            "name": "cpu_utilization",
            "threshold": "eighty"
        }));
        assert!(result.is_err());

        let result = serde_json::from_value::<CheckSpec>(json!({"threshold": 80}));
        assert!(result.is_err());
    }

    #[test]
    fn test_builder() {
        let spec = CheckSpec::new("cpu_utilization")
            .with_cpu_tiers(70.0, 90.0)
            .with_ignore_errors(true);
        assert_eq!(spec.warning_threshold, Some(70.0));
        assert_eq!(spec.critical_threshold, Some(90.0));
        assert!(spec.ignore_errors);
    }
}
