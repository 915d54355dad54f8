//! Raw device facts.
//!
//! Facts are an untyped JSON object whose shape depends on the platform
//! that produced them. This module only wraps the object and provides the
//! typed accessors the normalizers probe with; it never reshapes the data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::utils::math::as_number;

/// Key under which facts may embed threshold overrides
pub const THRESHOLDS_SECTION: &str = "thresholds";

// ═══════════════════════════════════════════════════════════════════════════════
// RAW FACTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Vendor-specific health facts for one device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawFacts(Map<String, Value>);

impl RawFacts {
    /// Wrap an existing JSON object
    pub fn new(facts: Map<String, Value>) -> Self {
        Self(facts)
    }

    /// Build from an arbitrary JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::MalformedFacts {
                section: "facts".into(),
                expected: format!("a JSON object, got {}", json_type(&other)),
            }),
        }
    }

    /// Parse from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Top-level section
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Top-level section, only if it is a mapping
    pub fn mapping(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    /// Top-level section, only if it is a sequence
    pub fn sequence(&self, key: &str) -> Option<&Vec<Value>> {
        self.0.get(key).and_then(Value::as_array)
    }

    /// Whether a top-level section exists
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Threshold embedded in the facts' `thresholds` mapping
    pub fn embedded_threshold(&self, key: &str) -> Option<f64> {
        self.mapping(THRESHOLDS_SECTION)
            .and_then(|thresholds| number(thresholds, key))
    }

    /// Borrow the underlying object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Clone into a JSON value
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Number of top-level sections
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no sections at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RawFacts {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for RawFacts {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FIELD ACCESSORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Numeric field of a mapping
pub fn number(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(as_number)
}

/// Numeric field of a mapping, 0 when absent or non-numeric
pub fn number_or_zero(map: &Map<String, Value>, key: &str) -> f64 {
    number(map, key).unwrap_or(0.0)
}

/// Nested mapping field
pub fn nested<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    map.get(key).and_then(Value::as_object)
}

/// JSON type name for diagnostics
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
