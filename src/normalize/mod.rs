//! Fact Normalizer.
//!
//! Projects vendor-specific fact shapes onto one canonical metric per
//! family. Every family is a closed set of known shapes probed in a fixed
//! priority order: the first shape present wins, and a section of the wrong
//! JSON type is skipped rather than reported. When nothing matches, the
//! family falls back to a zero/empty metric (or `None` where the evaluator
//! needs to tell "absent" apart from "zero").
//!
//! # Families
//!
//! - **CPU**: `cpu_usage` → `cpu` → `global` → `processes`
//! - **Memory**: `physical_memory` → `memory_usage` → `processor_memory`
//! - **Uptime**: `uptime` → `uptime_parsed.uptime` → `system_uptime`
//! - **Filesystem**: `fs_health.fs_health` → `fs_health` → `filesystem` → root
//! - **BGP / OSPF neighbors**: `neighbors`, `ospf.neighbors`
//! - **Crash files**: `crash_files` → `crash_health.crash_files`
//! - **Environment**: `env_health` → `environment`

pub mod cpu;
pub mod crash;
pub mod environment;
pub mod filesystem;
pub mod memory;
pub mod neighbors;
pub mod uptime;

pub use cpu::{CpuMetric, CpuShape};
pub use crash::{CrashMetric, CrashShape};
pub use environment::{EnvironmentMetric, EnvironmentShape, UnitStatus};
pub use filesystem::{FilesystemMetric, FilesystemShape};
pub use memory::{MemoryMetric, MemoryShape};
pub use neighbors::{Neighbor, NeighborMetric, Protocol, SessionState};
pub use uptime::{UptimeMetric, UptimeShape};

use serde::Serialize;

use crate::facts::RawFacts;

// ═══════════════════════════════════════════════════════════════════════════════
// METRIC FAMILY
// ═══════════════════════════════════════════════════════════════════════════════

/// Metric families the normalizer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFamily {
    /// CPU utilization
    Cpu,
    /// Memory figures
    Memory,
    /// Uptime
    Uptime,
    /// Filesystem free space
    Filesystem,
    /// BGP neighbor table
    Bgp,
    /// OSPF neighbor table
    Ospf,
    /// Crash files
    CrashFiles,
    /// Temperature, fans and power
    Environment,
}

impl MetricFamily {
    /// All families
    pub fn all() -> &'static [MetricFamily] {
        &[
            MetricFamily::Cpu,
            MetricFamily::Memory,
            MetricFamily::Uptime,
            MetricFamily::Filesystem,
            MetricFamily::Bgp,
            MetricFamily::Ospf,
            MetricFamily::CrashFiles,
            MetricFamily::Environment,
        ]
    }

    /// Family name
    pub fn name(&self) -> &'static str {
        match self {
            MetricFamily::Cpu => "cpu",
            MetricFamily::Memory => "memory",
            MetricFamily::Uptime => "uptime",
            MetricFamily::Filesystem => "filesystem",
            MetricFamily::Bgp => "bgp",
            MetricFamily::Ospf => "ospf",
            MetricFamily::CrashFiles => "crash_files",
            MetricFamily::Environment => "environment",
        }
    }
}

impl std::str::FromStr for MetricFamily {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricFamily::all()
            .iter()
            .copied()
            .find(|family| family.name() == s)
            .ok_or_else(|| crate::error::Error::InvalidInput(format!("Unknown metric family: {}", s)))
    }
}

impl std::fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CANONICAL METRIC
// ═══════════════════════════════════════════════════════════════════════════════

/// Canonical metric for any family
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CanonicalMetric {
    /// CPU utilization
    Cpu(CpuMetric),
    /// Memory figures
    Memory(MemoryMetric),
    /// Uptime
    Uptime(UptimeMetric),
    /// Filesystem free space; `None` when the data is unusable
    Filesystem(Option<FilesystemMetric>),
    /// BGP or OSPF neighbor table
    Neighbors(NeighborMetric),
    /// Crash files
    CrashFiles(CrashMetric),
    /// Environment readings; `None` when no section exists
    Environment(Option<EnvironmentMetric>),
}

/// Normalize one metric family from raw facts
pub fn normalize(facts: &RawFacts, family: MetricFamily) -> CanonicalMetric {
    let metric = match family {
        MetricFamily::Cpu => CanonicalMetric::Cpu(cpu::normalize(facts)),
        MetricFamily::Memory => CanonicalMetric::Memory(memory::normalize(facts)),
        MetricFamily::Uptime => CanonicalMetric::Uptime(uptime::normalize(facts)),
        MetricFamily::Filesystem => CanonicalMetric::Filesystem(filesystem::normalize(facts)),
        MetricFamily::Bgp => CanonicalMetric::Neighbors(neighbors::normalize(facts, Protocol::Bgp)),
        MetricFamily::Ospf => CanonicalMetric::Neighbors(neighbors::normalize(facts, Protocol::Ospf)),
        MetricFamily::CrashFiles => CanonicalMetric::CrashFiles(crash::normalize(facts)),
        MetricFamily::Environment => CanonicalMetric::Environment(environment::normalize(facts)),
    };
    tracing::debug!(family = family.name(), "normalized facts");
    metric
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_family_names_roundtrip() {
        for family in MetricFamily::all() {
            let parsed: MetricFamily = family.name().parse().unwrap();
            assert_eq!(parsed, *family);
        }
        assert!("disk".parse::<MetricFamily>().is_err());
    }

    #[test]
    fn test_dispatch() {
        let facts = RawFacts::from_value(json!({
            "cpu_usage": {"five_minute": 12},
            "crash_files": ["a"]
        }))
        .unwrap();

        match normalize(&facts, MetricFamily::Cpu) {
            CanonicalMetric::Cpu(cpu) => assert_eq!(cpu.current_utilization, 12.0),
            other => panic!("unexpected metric: {:?}", other),
        }
        match normalize(&facts, MetricFamily::CrashFiles) {
            CanonicalMetric::CrashFiles(crash) => assert_eq!(crash.count(), 1),
            other => panic!("unexpected metric: {:?}", other),
        }
        assert_eq!(
            normalize(&facts, MetricFamily::Environment),
            CanonicalMetric::Environment(None)
        );
    }

    #[test]
    fn test_cpu_shapes_share_canonical_form() {
        let shapes = [
            json!({"cpu_usage": {"five_minute": 42}}),
            json!({"cpu": {"15_min_avg": 42, "5_min_avg": 42}}),
            json!({"global": {"five_minute": 42}}),
            json!({"processes": {"five_minute": 42}}),
        ];
        for shape in shapes {
            let facts = RawFacts::from_value(shape).unwrap();
            let cpu = cpu::normalize(&facts);
            assert_eq!(cpu.current_utilization, 42.0);
            assert_eq!(cpu.five_min_avg, 42.0);
        }
    }
}
