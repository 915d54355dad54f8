//! Memory normalization.
//!
//! Three vendor shapes carry memory figures in different units:
//!
//! | section | units | buffers/cache |
//! |---|---|---|
//! | `physical_memory` | MB (`total`, `available`) | not reported, 0 |
//! | `memory_usage` | bytes (`total`, `used`, `free`) | not reported, 0 |
//! | `processor_memory` | MB (`total_mb`, `used_mb`, `free_mb`), bytes (`buffers`, `cache`) | converted to MB |
//!
//! Free, buffer and cache figures converted from bytes are truncated to
//! whole megabytes.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::facts::{number_or_zero, RawFacts};
use crate::utils::constants::BYTES_PER_MB;
use crate::utils::math::{percentage, round2, serialize_number, truncate};

// ═══════════════════════════════════════════════════════════════════════════════
// SHAPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Known memory fact shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryShape {
    /// `physical_memory`, megabytes
    PhysicalMemory,
    /// `memory_usage`, bytes
    MemoryUsage,
    /// `processor_memory`, megabytes plus byte-valued buffers/cache
    ProcessorMemory,
    /// No recognized section
    Absent,
}

impl MemoryShape {
    /// Probe order; the first present shape wins
    pub const PRIORITY: [MemoryShape; 3] = [
        MemoryShape::PhysicalMemory,
        MemoryShape::MemoryUsage,
        MemoryShape::ProcessorMemory,
    ];

    /// Top-level section holding this shape
    pub fn section(&self) -> Option<&'static str> {
        match self {
            MemoryShape::PhysicalMemory => Some("physical_memory"),
            MemoryShape::MemoryUsage => Some("memory_usage"),
            MemoryShape::ProcessorMemory => Some("processor_memory"),
            MemoryShape::Absent => None,
        }
    }

    /// Detect the shape present in the facts
    pub fn detect(facts: &RawFacts) -> Self {
        Self::PRIORITY
            .iter()
            .copied()
            .find(|shape| shape.section().is_some_and(|key| facts.mapping(key).is_some()))
            .unwrap_or(MemoryShape::Absent)
    }

    fn extract(&self, section: &Map<String, Value>) -> MemoryMetric {
        let get = |key: &str| number_or_zero(section, key);
        match self {
            MemoryShape::PhysicalMemory => {
                let total = get("total");
                let available = get("available");
                MemoryMetric {
                    shape: *self,
                    total_mb: total,
                    used_mb: total - available,
                    free_mb: available,
                    buffers_mb: 0.0,
                    cache_mb: 0.0,
                }
            }
            MemoryShape::MemoryUsage => MemoryMetric {
                shape: *self,
                total_mb: get("total") / BYTES_PER_MB,
                used_mb: get("used") / BYTES_PER_MB,
                free_mb: truncate(get("free") / BYTES_PER_MB),
                buffers_mb: 0.0,
                cache_mb: 0.0,
            },
            MemoryShape::ProcessorMemory => MemoryMetric {
                shape: *self,
                total_mb: get("total_mb"),
                used_mb: get("used_mb"),
                free_mb: get("free_mb"),
                buffers_mb: truncate(get("buffers") / BYTES_PER_MB),
                cache_mb: truncate(get("cache") / BYTES_PER_MB),
            },
            MemoryShape::Absent => MemoryMetric::absent(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CANONICAL METRIC
// ═══════════════════════════════════════════════════════════════════════════════

/// Canonical memory figures, in megabytes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryMetric {
    /// Shape the values came from
    pub shape: MemoryShape,
    /// Total memory
    #[serde(serialize_with = "serialize_number")]
    pub total_mb: f64,
    /// Used memory
    #[serde(serialize_with = "serialize_number")]
    pub used_mb: f64,
    /// Free memory
    #[serde(serialize_with = "serialize_number")]
    pub free_mb: f64,
    /// Buffer memory
    #[serde(serialize_with = "serialize_number")]
    pub buffers_mb: f64,
    /// Cache memory
    #[serde(serialize_with = "serialize_number")]
    pub cache_mb: f64,
}

impl MemoryMetric {
    /// Fallback when no memory section is present
    pub fn absent() -> Self {
        Self {
            shape: MemoryShape::Absent,
            total_mb: 0.0,
            used_mb: 0.0,
            free_mb: 0.0,
            buffers_mb: 0.0,
            cache_mb: 0.0,
        }
    }

    /// Utilization as judged by the utilization check (whole percent, truncated)
    pub fn utilization_percent(&self) -> f64 {
        truncate(percentage(self.used_mb, self.total_mb))
    }

    /// Utilization as reported by the summary (two decimals)
    pub fn utilization_percent_precise(&self) -> f64 {
        round2(percentage(self.used_mb, self.total_mb))
    }
}

/// Normalize memory facts
pub fn normalize(facts: &RawFacts) -> MemoryMetric {
    let shape = MemoryShape::detect(facts);
    match shape.section().and_then(|key| facts.mapping(key)) {
        Some(section) => shape.extract(section),
        None => MemoryMetric::absent(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MB: f64 = 1_048_576.0;

    fn facts(value: Value) -> RawFacts {
        RawFacts::from_value(value).unwrap()
    }

    #[test]
    fn test_physical_memory_shape() {
        let metric = normalize(&facts(json!({
            "physical_memory": {"total": 4000, "available": 1000}
        })));
        assert_eq!(metric.shape, MemoryShape::PhysicalMemory);
        assert_eq!(metric.used_mb, 3000.0);
        assert_eq!(metric.free_mb, 1000.0);
        assert_eq!(metric.buffers_mb, 0.0);
        assert_eq!(metric.cache_mb, 0.0);
        assert_eq!(metric.utilization_percent(), 75.0);
    }

    #[test]
    fn test_memory_usage_converts_bytes() {
        let metric = normalize(&facts(json!({
            "memory_usage": {
                "total": 8.0 * MB * 1024.0,
                "used": 2.0 * MB * 1024.0,
                "free": 6.0 * MB * 1024.0 + 500_000.0
            }
        })));
        assert_eq!(metric.shape, MemoryShape::MemoryUsage);
        assert_eq!(metric.total_mb, 8192.0);
        assert_eq!(metric.free_mb, 6144.0);
        assert_eq!(metric.utilization_percent(), 25.0);
    }

    #[test]
    fn test_processor_memory_shape() {
        let metric = normalize(&facts(json!({
            "processor_memory": {
                "total_mb": 1000,
                "used_mb": 333,
                "free_mb": 667,
                "buffers": 64.0 * MB,
                "cache": 128.5 * MB
            }
        })));
        assert_eq!(metric.shape, MemoryShape::ProcessorMemory);
        assert_eq!(metric.buffers_mb, 64.0);
        assert_eq!(metric.cache_mb, 128.0);
        assert_eq!(metric.utilization_percent(), 33.0);
        assert_eq!(metric.utilization_percent_precise(), 33.3);
    }

    #[test]
    fn test_priority_when_shapes_coexist() {
        let metric = normalize(&facts(json!({
            "processor_memory": {"total_mb": 10, "used_mb": 10},
            "physical_memory": {"total": 100, "available": 90}
        })));
        assert_eq!(metric.shape, MemoryShape::PhysicalMemory);
        assert_eq!(metric.utilization_percent(), 10.0);
    }

    #[test]
    fn test_absent_and_zero_total() {
        let metric = normalize(&facts(json!({})));
        assert_eq!(metric, MemoryMetric::absent());
        assert_eq!(metric.utilization_percent(), 0.0);

        let metric = normalize(&facts(json!({"physical_memory": "broken"})));
        assert_eq!(metric.shape, MemoryShape::Absent);
    }

    #[test]
    fn test_same_figures_across_shapes() {
        let physical = normalize(&facts(json!({
            "physical_memory": {"total": 2048, "available": 512}
        })));
        let processor = normalize(&facts(json!({
            "processor_memory": {"total_mb": 2048, "used_mb": 1536, "free_mb": 512}
        })));
        assert_eq!(physical.utilization_percent(), processor.utilization_percent());
        assert_eq!(physical.free_mb, processor.free_mb);
    }
}
