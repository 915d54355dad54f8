//! CPU utilization normalization.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::facts::{number, number_or_zero, RawFacts};
use crate::utils::math::{serialize_number, serialize_opt_number, truncate};

// ═══════════════════════════════════════════════════════════════════════════════
// SHAPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Known CPU fact shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuShape {
    /// `cpu_usage` with `five_minute`/`one_minute`/`five_seconds`
    CpuUsage,
    /// `cpu` with `15_min_avg`/`5_min_avg`/`1_min_avg`
    Cpu,
    /// `global` with `five_minute`
    Global,
    /// `processes` with `five_minute`
    Processes,
    /// No recognized section
    Absent,
}

impl CpuShape {
    /// Probe order; the first present shape wins
    pub const PRIORITY: [CpuShape; 4] = [
        CpuShape::CpuUsage,
        CpuShape::Cpu,
        CpuShape::Global,
        CpuShape::Processes,
    ];

    /// Top-level section holding this shape
    pub fn section(&self) -> Option<&'static str> {
        match self {
            CpuShape::CpuUsage => Some("cpu_usage"),
            CpuShape::Cpu => Some("cpu"),
            CpuShape::Global => Some("global"),
            CpuShape::Processes => Some("processes"),
            CpuShape::Absent => None,
        }
    }

    /// Detect the shape present in the facts
    pub fn detect(facts: &RawFacts) -> Self {
        Self::PRIORITY
            .iter()
            .copied()
            .find(|shape| shape.section().is_some_and(|key| facts.mapping(key).is_some()))
            .unwrap_or(CpuShape::Absent)
    }

    fn extract(&self, section: &Map<String, Value>) -> CpuMetric {
        let opt = |key: &str| number(section, key).map(truncate);
        match self {
            CpuShape::CpuUsage => {
                let five_minute = truncate(number_or_zero(section, "five_minute"));
                CpuMetric {
                    shape: *self,
                    current_utilization: five_minute,
                    five_min_avg: five_minute,
                    one_min_avg: opt("one_minute"),
                    five_sec_avg: opt("five_seconds"),
                }
            }
            CpuShape::Cpu => CpuMetric {
                shape: *self,
                current_utilization: truncate(number_or_zero(section, "15_min_avg")),
                five_min_avg: truncate(number_or_zero(section, "5_min_avg")),
                one_min_avg: opt("1_min_avg"),
                five_sec_avg: None,
            },
            CpuShape::Global | CpuShape::Processes => {
                let five_minute = truncate(number_or_zero(section, "five_minute"));
                CpuMetric {
                    shape: *self,
                    current_utilization: five_minute,
                    five_min_avg: five_minute,
                    one_min_avg: opt("one_minute"),
                    five_sec_avg: opt("five_seconds"),
                }
            }
            CpuShape::Absent => CpuMetric::absent(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CANONICAL METRIC
// ═══════════════════════════════════════════════════════════════════════════════

/// Canonical CPU utilization, in whole percent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuMetric {
    /// Shape the values came from
    pub shape: CpuShape,
    /// Value judged by the utilization check
    #[serde(serialize_with = "serialize_number")]
    pub current_utilization: f64,
    /// Five minute average
    #[serde(serialize_with = "serialize_number")]
    pub five_min_avg: f64,
    /// One minute average, when reported
    #[serde(serialize_with = "serialize_opt_number", skip_serializing_if = "Option::is_none")]
    pub one_min_avg: Option<f64>,
    /// Five second average, when reported
    #[serde(serialize_with = "serialize_opt_number", skip_serializing_if = "Option::is_none")]
    pub five_sec_avg: Option<f64>,
}

impl CpuMetric {
    /// Fallback when no CPU section is present
    pub fn absent() -> Self {
        Self {
            shape: CpuShape::Absent,
            current_utilization: 0.0,
            five_min_avg: 0.0,
            one_min_avg: None,
            five_sec_avg: None,
        }
    }
}

/// Normalize CPU facts
pub fn normalize(facts: &RawFacts) -> CpuMetric {
    let shape = CpuShape::detect(facts);
    match shape.section().and_then(|key| facts.mapping(key)) {
        Some(section) => shape.extract(section),
        None => CpuMetric::absent(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn facts(value: Value) -> RawFacts {
        RawFacts::from_value(value).unwrap()
    }

    #[test]
    fn test_cpu_usage_shape() {
        let metric = normalize(&facts(json!({
            "cpu_usage": {"five_minute": 50, "one_minute": 40, "five_seconds": 30}
        })));
        assert_eq!(metric.shape, CpuShape::CpuUsage);
        assert_eq!(metric.current_utilization, 50.0);
        assert_eq!(metric.five_min_avg, 50.0);
        assert_eq!(metric.one_min_avg, Some(40.0));
        assert_eq!(metric.five_sec_avg, Some(30.0));
    }

    #[test]
    fn test_cpu_shape_uses_fifteen_minute_average() {
        let metric = normalize(&facts(json!({
            "cpu": {"15_min_avg": 22, "5_min_avg": 31, "1_min_avg": 45}
        })));
        assert_eq!(metric.shape, CpuShape::Cpu);
        assert_eq!(metric.current_utilization, 22.0);
        assert_eq!(metric.five_min_avg, 31.0);
    }

    #[test]
    fn test_global_and_processes_shapes() {
        let global = normalize(&facts(json!({"global": {"five_minute": 7}})));
        assert_eq!(global.shape, CpuShape::Global);
        assert_eq!(global.current_utilization, 7.0);

        let processes = normalize(&facts(json!({"processes": {"five_minute": "9"}})));
        assert_eq!(processes.shape, CpuShape::Processes);
        assert_eq!(processes.current_utilization, 9.0);
    }

    #[test]
    fn test_priority_when_shapes_coexist() {
        let metric = normalize(&facts(json!({
            "processes": {"five_minute": 90},
            "global": {"five_minute": 80},
            "cpu_usage": {"five_minute": 10}
        })));
        assert_eq!(metric.shape, CpuShape::CpuUsage);
        assert_eq!(metric.current_utilization, 10.0);
    }

    #[test]
    fn test_malformed_section_falls_through() {
        let metric = normalize(&facts(json!({
            "cpu_usage": "n/a",
            "global": {"five_minute": 12}
        })));
        assert_eq!(metric.shape, CpuShape::Global);
        assert_eq!(metric.current_utilization, 12.0);
    }

    #[test]
    fn test_absent_falls_back_to_zero() {
        let metric = normalize(&facts(json!({"uptime": {}})));
        assert_eq!(metric, CpuMetric::absent());
    }

    #[test]
    fn test_values_truncate() {
        let metric = normalize(&facts(json!({"cpu_usage": {"five_minute": 79.9}})));
        assert_eq!(metric.current_utilization, 79.0);
    }
}
