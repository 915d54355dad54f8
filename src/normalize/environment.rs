//! Environment (temperature, fans, power) normalization.
//!
//! Platforms report the environment either under `env_health` or under
//! `environment`. Inside, temperature is `temperature.current`, a bare
//! numeric `temperature`, or `temp`; a platform may embed its own limit in
//! `temperature.threshold`. Fans and power supplies come either as one
//! summary string (`fan_status`, `power_status`) or as a list of units
//! (`fans`, `power_supplies`), each unit a status string or a
//! `{name, status}` record.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::facts::{nested, number, RawFacts};
use crate::utils::constants::{ENV_FAN_UNSUPPORTED, ENV_STATUS_OK};
use crate::utils::math::{as_number, as_state, serialize_opt_number};

/// Known environment locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentShape {
    /// `env_health`
    EnvHealth,
    /// `environment`
    Environment,
}

impl EnvironmentShape {
    /// Probe order; the first present mapping wins
    pub const PRIORITY: [EnvironmentShape; 2] =
        [EnvironmentShape::EnvHealth, EnvironmentShape::Environment];

    /// Top-level section holding this shape
    pub fn section(&self) -> &'static str {
        match self {
            EnvironmentShape::EnvHealth => "env_health",
            EnvironmentShape::Environment => "environment",
        }
    }
}

/// Status of one fan or power unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitStatus {
    /// Unit name, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Status exactly as reported
    pub status: String,
}

impl UnitStatus {
    /// Whether the unit reports OK (case-insensitive)
    pub fn is_ok(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case(ENV_STATUS_OK)
    }

    /// Whether the platform says it cannot report this unit
    pub fn is_unsupported(&self) -> bool {
        let status = self.status.trim().to_ascii_lowercase();
        ENV_FAN_UNSUPPORTED.contains(&status.as_str())
    }
}

/// Canonical environment readings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentMetric {
    /// Location the readings came from
    pub shape: EnvironmentShape,
    /// Current temperature, when reported
    #[serde(serialize_with = "serialize_opt_number")]
    pub temperature: Option<f64>,
    /// Temperature limit the platform itself reports
    #[serde(serialize_with = "serialize_opt_number", skip_serializing_if = "Option::is_none")]
    pub embedded_threshold: Option<f64>,
    /// Fan units
    pub fans: Vec<UnitStatus>,
    /// Power units
    pub power: Vec<UnitStatus>,
}

impl EnvironmentMetric {
    /// Fans that fail the check (not OK and not unsupported)
    pub fn failed_fans(&self) -> Vec<&UnitStatus> {
        self.fans
            .iter()
            .filter(|fan| !fan.is_ok() && !fan.is_unsupported())
            .collect()
    }

    /// Power units that are not OK
    pub fn failed_power(&self) -> Vec<&UnitStatus> {
        self.power.iter().filter(|unit| !unit.is_ok()).collect()
    }
}

fn read_temperature(section: &Map<String, Value>) -> (Option<f64>, Option<f64>) {
    match section.get("temperature") {
        Some(Value::Object(reading)) => (
            number(reading, "current").or_else(|| number(reading, "value")),
            number(reading, "threshold"),
        ),
        Some(reading) => (
            as_number(reading).or_else(|| number(section, "temp")),
            None,
        ),
        None => (number(section, "temp"), None),
    }
}

fn units(section: &Map<String, Value>, summary_key: &str, list_key: &str) -> Vec<UnitStatus> {
    if let Some(status) = section.get(summary_key).and_then(as_state) {
        return vec![UnitStatus { name: None, status }];
    }

    let Some(list) = section.get(list_key).and_then(Value::as_array) else {
        return Vec::new();
    };

    list.iter()
        .filter_map(|unit| match unit {
            Value::Object(fields) => Some(UnitStatus {
                name: fields.get("name").and_then(as_state),
                status: fields
                    .get("status")
                    .and_then(as_state)
                    .unwrap_or_else(|| "unknown".into()),
            }),
            scalar => as_state(scalar).map(|status| UnitStatus { name: None, status }),
        })
        .collect()
}

/// Normalize environment facts; `None` when no environment section exists
pub fn normalize(facts: &RawFacts) -> Option<EnvironmentMetric> {
    let (shape, section) = EnvironmentShape::PRIORITY
        .iter()
        .find_map(|shape| facts.mapping(shape.section()).map(|section| (*shape, section)))?;

    // `env_health.env_health` appears when a collector wraps its own output
    let section = nested(section, shape.section()).unwrap_or(section);
    let (temperature, embedded_threshold) = read_temperature(section);

    Some(EnvironmentMetric {
        shape,
        temperature,
        embedded_threshold,
        fans: units(section, "fan_status", "fans"),
        power: units(section, "power_status", "power_supplies"),
    })
}
