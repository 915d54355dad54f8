//! Uptime normalization.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::facts::{nested, number_or_zero, RawFacts};
use crate::utils::constants::{MINUTES_PER_DAY, MINUTES_PER_HOUR, MINUTES_PER_WEEK};
use crate::utils::math::{serialize_number, truncate};

/// Known uptime fact shapes, each a `{weeks, days, hours, minutes}` mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UptimeShape {
    /// `uptime`
    Uptime,
    /// `uptime_parsed.uptime`
    UptimeParsed,
    /// `system_uptime`
    SystemUptime,
    /// No recognized section
    Absent,
}

impl UptimeShape {
    /// Probe order; the first present shape wins
    pub const PRIORITY: [UptimeShape; 3] = [
        UptimeShape::Uptime,
        UptimeShape::UptimeParsed,
        UptimeShape::SystemUptime,
    ];

    fn locate<'a>(&self, facts: &'a RawFacts) -> Option<&'a Map<String, Value>> {
        match self {
            UptimeShape::Uptime => facts.mapping("uptime"),
            UptimeShape::UptimeParsed => facts
                .mapping("uptime_parsed")
                .and_then(|parsed| nested(parsed, "uptime")),
            UptimeShape::SystemUptime => facts.mapping("system_uptime"),
            UptimeShape::Absent => None,
        }
    }
}

/// Canonical uptime
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UptimeMetric {
    /// Shape the values came from
    pub shape: UptimeShape,
    /// Total uptime in whole minutes
    #[serde(serialize_with = "serialize_number")]
    pub total_minutes: f64,
}

impl UptimeMetric {
    /// Fallback when no uptime section is present
    pub fn absent() -> Self {
        Self {
            shape: UptimeShape::Absent,
            total_minutes: 0.0,
        }
    }
}

/// Total minutes of a `{weeks, days, hours, minutes}` mapping
pub fn total_minutes(section: &Map<String, Value>) -> f64 {
    let get = |key: &str| number_or_zero(section, key);
    truncate(
        get("weeks") * MINUTES_PER_WEEK as f64
            + get("days") * MINUTES_PER_DAY as f64
            + get("hours") * MINUTES_PER_HOUR as f64
            + get("minutes"),
    )
}

/// Normalize uptime facts
pub fn normalize(facts: &RawFacts) -> UptimeMetric {
    UptimeShape::PRIORITY
        .iter()
        .find_map(|shape| {
            shape.locate(facts).map(|section| UptimeMetric {
                shape: *shape,
                total_minutes: total_minutes(section),
            })
        })
        .unwrap_or_else(UptimeMetric::absent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn facts(value: Value) -> RawFacts {
        RawFacts::from_value(value).unwrap()
    }

    #[test]
    fn test_total_minutes() {
        let metric = normalize(&facts(json!({
            "uptime": {"weeks": 1, "days": 2, "hours": 3, "minutes": 4}
        })));
        assert_eq!(metric.shape, UptimeShape::Uptime);
        assert_eq!(metric.total_minutes, 10080.0 + 2880.0 + 180.0 + 4.0);
    }

    #[test]
    fn test_all_shapes_agree() {
        let body = json!({"days": 1, "hours": 1});
        let a = normalize(&facts(json!({"uptime": body.clone()})));
        let b = normalize(&facts(json!({"uptime_parsed": {"uptime": body.clone()}})));
        let c = normalize(&facts(json!({"system_uptime": body})));

        assert_eq!(a.total_minutes, 1500.0);
        assert_eq!(a.total_minutes, b.total_minutes);
        assert_eq!(b.total_minutes, c.total_minutes);
        assert_eq!(b.shape, UptimeShape::UptimeParsed);
        assert_eq!(c.shape, UptimeShape::SystemUptime);
    }

    #[test]
    fn test_uptime_parsed_without_inner_mapping_falls_through() {
        let metric = normalize(&facts(json!({
            "uptime_parsed": {"raw": "2 weeks"},
            "system_uptime": {"minutes": 42}
        })));
        assert_eq!(metric.shape, UptimeShape::SystemUptime);
        assert_eq!(metric.total_minutes, 42.0);
    }

    #[test]
    fn test_absent() {
        assert_eq!(normalize(&facts(json!({"uptime": "3 days"}))), UptimeMetric::absent());
    }
}
