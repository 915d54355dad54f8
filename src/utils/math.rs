//! Percentage arithmetic and JSON number helpers.
//!
//! Device facts arrive as JSON numbers or numeric strings; every measured
//! value is carried as `f64` and written back as an integer whenever it has
//! no fractional part, so `50` never turns into `50.0` in a report.

use serde::Serializer;
use serde_json::{Number, Value};

// ═══════════════════════════════════════════════════════════════════════════════
// COERCION
// ═══════════════════════════════════════════════════════════════════════════════

/// Read a JSON value as a number.
///
/// Accepts numbers and numeric strings (surrounding whitespace and a trailing
/// `%` are ignored). Booleans, nulls, arrays and objects read as absent.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
            trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Render a scalar fact as a state string (`1` and `"1"` compare equal)
pub fn as_state(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PERCENTAGES
// ═══════════════════════════════════════════════════════════════════════════════

/// `part / total * 100`, or 0 when the total is not positive
pub fn percentage(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        (part / total) * 100.0
    } else {
        0.0
    }
}

/// Truncate toward zero, the way utilization checks report integers
pub fn truncate(value: f64) -> f64 {
    value.trunc()
}

/// Round half away from zero to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ═══════════════════════════════════════════════════════════════════════════════
// JSON OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

/// Convert a measured value to JSON, preferring an integer representation
pub fn to_json_number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::Number(Number::from(value as i64))
    } else {
        Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// `serialize_with` helper for measured values
pub fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// `serialize_with` helper for optional measured values
pub fn serialize_opt_number<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serialize_number(v, serializer),
        None => serializer.serialize_none(),
    }
}
