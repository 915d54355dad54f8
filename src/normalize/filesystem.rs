//! Filesystem normalization.
//!
//! Free space is read from the first location that carries both `free` and
//! `total`: `fs_health.fs_health`, then `fs_health`, then `filesystem`, then
//! the top level of the facts. A zero or negative total makes the data
//! unusable rather than falling through to the next location.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::facts::{nested, number, RawFacts};
use crate::utils::math::{percentage, round2, serialize_number, truncate};

/// Known filesystem fact locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilesystemShape {
    /// `fs_health.fs_health`
    NestedFsHealth,
    /// `fs_health`
    FsHealth,
    /// `filesystem`
    Filesystem,
    /// `free`/`total` directly in the facts
    Root,
}

impl FilesystemShape {
    /// Probe order; the first location with both figures wins
    pub const PRIORITY: [FilesystemShape; 4] = [
        FilesystemShape::NestedFsHealth,
        FilesystemShape::FsHealth,
        FilesystemShape::Filesystem,
        FilesystemShape::Root,
    ];

    fn locate<'a>(&self, facts: &'a RawFacts) -> Option<&'a Map<String, Value>> {
        match self {
            FilesystemShape::NestedFsHealth => facts
                .mapping("fs_health")
                .and_then(|outer| nested(outer, "fs_health")),
            FilesystemShape::FsHealth => facts.mapping("fs_health"),
            FilesystemShape::Filesystem => facts.mapping("filesystem"),
            FilesystemShape::Root => Some(facts.as_map()),
        }
    }
}

/// Canonical free-space figures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilesystemMetric {
    /// Location the values came from
    pub shape: FilesystemShape,
    /// Free space, in the device's unit
    #[serde(serialize_with = "serialize_number")]
    pub free: f64,
    /// Total space, in the device's unit
    #[serde(serialize_with = "serialize_number")]
    pub total: f64,
    /// `free / total * 100`, two decimals
    #[serde(serialize_with = "serialize_number")]
    pub free_percent: f64,
}

/// Normalize filesystem free space; `None` when no usable figures exist
pub fn normalize(facts: &RawFacts) -> Option<FilesystemMetric> {
    let (shape, free, total) = FilesystemShape::PRIORITY.iter().find_map(|shape| {
        let section = shape.locate(facts)?;
        match (number(section, "free"), number(section, "total")) {
            (Some(free), Some(total)) => Some((*shape, free, total)),
            _ => None,
        }
    })?;

    if total <= 0.0 {
        tracing::warn!(?shape, total, "filesystem total is not positive, data unusable");
        return None;
    }

    Some(FilesystemMetric {
        shape,
        free,
        total,
        free_percent: round2(percentage(free, total)),
    })
}

/// Used-space percentage for the utilization check.
///
/// Reads `filesystem.used_percent`; otherwise derives it from free space;
/// otherwise 0. Always truncated to a whole percent.
pub fn used_percent(facts: &RawFacts) -> f64 {
    if let Some(used) = facts
        .mapping("filesystem")
        .and_then(|fs| number(fs, "used_percent"))
    {
        return truncate(used);
    }

    normalize(facts)
        .map(|metric| truncate(100.0 - metric.free_percent))
        .unwrap_or(0.0)
}
