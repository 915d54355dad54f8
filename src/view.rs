//! Health-check view.
//!
//! Entry points that take facts plus a target (the check list, bare or
//! wrapped), run every recognized check and aggregate the outcomes. With no
//! checks to run the facts come back untouched.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::checks::spec::as_flag;
use crate::checks::{CheckKind, CheckSpec, EvaluateOptions, HealthEvaluator};
use crate::error::{Error, Result};
use crate::facts::{json_type, RawFacts};
use crate::report::{Report, ReportBuilder};

/// Name a wrapped target must carry
pub const HEALTH_CHECK_TARGET: &str = "health_check";

// ═══════════════════════════════════════════════════════════════════════════════
// TARGET
// ═══════════════════════════════════════════════════════════════════════════════

/// Checks to run, plus the wrapper's own `details` flag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Target {
    /// Checks in evaluation order
    pub checks: Vec<CheckSpec>,
    /// Attach the raw facts to the report
    pub details: bool,
}

impl Target {
    /// Target running the given checks
    pub fn new(checks: Vec<CheckSpec>) -> Self {
        Self {
            checks,
            details: false,
        }
    }

    /// Set the details flag
    pub fn with_details(mut self, details: bool) -> Self {
        self.details = details;
        self
    }

    /// Whether there is nothing to evaluate
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Parse either accepted target form.
    ///
    /// - a list of checks
    /// - `{name: "health_check", vars: {checks: [...], details: bool}}`
    /// - `null`, or a wrapper without checks, which means passthrough
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Array(checks) => Ok(Self::new(parse_checks(checks)?)),
            Value::Object(mut wrapper) => {
                match wrapper.get("name").and_then(Value::as_str) {
                    Some(HEALTH_CHECK_TARGET) => {}
                    Some(other) => {
                        return Err(Error::InvalidInput(format!(
                            "target name must be '{}', got '{}'",
                            HEALTH_CHECK_TARGET, other
                        )))
                    }
                    None => {
                        return Err(Error::InvalidInput(format!(
                            "target must be a list of checks or a '{}' object",
                            HEALTH_CHECK_TARGET
                        )))
                    }
                }

                let mut vars = match wrapper.remove("vars") {
                    None | Some(Value::Null) => return Ok(Self::default()),
                    Some(Value::Object(vars)) => vars,
                    Some(other) => {
                        return Err(Error::InvalidInput(format!(
                            "target vars must be an object, got {}",
                            json_type(&other)
                        )))
                    }
                };

                let details = match vars.get("details") {
                    None => false,
                    Some(flag) => as_flag(flag).ok_or_else(|| {
                        Error::InvalidInput(format!("target details must be a boolean, got {}", flag))
                    })?,
                };

                let checks = match vars.remove("checks") {
                    None | Some(Value::Null) => Vec::new(),
                    Some(Value::Array(checks)) => parse_checks(checks)?,
                    Some(other) => {
                        return Err(Error::InvalidInput(format!(
                            "target checks must be a list, got {}",
                            json_type(&other)
                        )))
                    }
                };

                Ok(Self { checks, details })
            }
            other => Err(Error::InvalidInput(format!(
                "target must be a list or an object, got {}",
                json_type(&other)
            ))),
        }
    }

    /// Parse from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }
}

impl From<Vec<CheckSpec>> for Target {
    fn from(checks: Vec<CheckSpec>) -> Self {
        Self::new(checks)
    }
}

// Unrecognized checks are dropped by name before their fields are read
fn parse_checks(checks: Vec<Value>) -> Result<Vec<CheckSpec>> {
    let mut parsed = Vec::with_capacity(checks.len());
    for (index, check) in checks.into_iter().enumerate() {
        let Some(name) = check.get("name").and_then(Value::as_str) else {
            return Err(Error::InvalidInput(format!("check #{}: missing string 'name'", index)));
        };
        if CheckKind::from_name(name).is_none() {
            tracing::debug!(check = name, "skipping unrecognized check");
            continue;
        }
        let spec = serde_json::from_value(check)
            .map_err(|e| Error::InvalidInput(format!("check #{}: {}", index, e)))?;
        parsed.push(spec);
    }
    Ok(parsed)
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVALUATE REQUEST
// ═══════════════════════════════════════════════════════════════════════════════

/// Loosely typed call, as received over the wire or from a template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    /// Raw device facts
    #[serde(default, alias = "health_facts", deserialize_with = "present")]
    pub facts: Option<Value>,
    /// Check list or wrapper; an explicit `null` is passthrough
    #[serde(default, deserialize_with = "present")]
    pub target: Option<Value>,
    /// Attach the raw facts to the report
    #[serde(default)]
    pub details: bool,
    /// CPU warning tier for checks that set none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_threshold: Option<f64>,
    /// CPU critical tier for checks that set none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_threshold: Option<f64>,
}

// Keeps an explicit `null` apart from a missing field
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl EvaluateRequest {
    /// Request for the given facts and target
    pub fn new(facts: Value, target: Value) -> Self {
        Self {
            facts: Some(facts),
            target: Some(target),
            ..Default::default()
        }
    }

    /// Call-level options carried by the request
    pub fn options(&self) -> EvaluateOptions {
        EvaluateOptions {
            details: self.details,
            warning_threshold: self.warning_threshold,
            critical_threshold: self.critical_threshold,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVALUATION
// ═══════════════════════════════════════════════════════════════════════════════

impl HealthEvaluator {
    /// Evaluate every check in the target and aggregate the report
    pub fn evaluate(&self, facts: &RawFacts, target: &Target, options: &EvaluateOptions) -> Result<Report> {
        if target.is_empty() {
            tracing::debug!("no checks requested, returning facts unchanged");
            return Ok(Report::Passthrough(facts.clone()));
        }

        let mut builder = ReportBuilder::new();
        for check in &target.checks {
            if let Some(outcome) = self.evaluate_check(facts, check, options)? {
                builder.push(outcome);
            }
        }

        if options.details || target.details {
            builder = builder.with_details(facts.to_value());
        }

        Ok(builder.finish().into())
    }

    /// Validate and evaluate a loosely typed request
    pub fn evaluate_request(&self, request: EvaluateRequest) -> Result<Report> {
        let options = request.options();
        let facts = request
            .facts
            .ok_or_else(|| Error::InvalidInput("missing 'facts' in request".into()))?;
        let target = request
            .target
            .ok_or_else(|| Error::InvalidInput("missing 'target' in request".into()))?;

        let facts = RawFacts::from_value(facts)?;
        let target = Target::from_value(target)?;
        self.evaluate(&facts, &target, &options)
    }
}

/// Evaluate against the process-wide default thresholds
pub fn evaluate(facts: &RawFacts, target: &Target, options: &EvaluateOptions) -> Result<Report> {
    HealthEvaluator::global().evaluate(facts, target, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::Verdict;
    use serde_json::json;

    #[test]
    fn test_target_list_form() {
        let target = Target::from_value(json!([{"name": "uptime"}, {"name": "crash_files", "max_count": 1}])).unwrap();
        assert_eq!(target.checks.len(), 2);
        assert!(!target.details);
    }

    #[test]
    fn test_target_wrapper_form() {
        let target = Target::from_value(json!({
            "name": "health_check",
            "vars": {"checks": [{"name": "uptime"}], "details": "yes"}
        }))
        .unwrap();
        assert_eq!(target.checks, vec![CheckSpec::new("uptime")]);
        assert!(target.details);
    }

    #[test]
    fn test_target_skips_unrecognized_checks_unread() {
        let target = Target::from_value(json!([
            {"name": "cpu_utilization", "threshold": 80},
            {"name": "interface_errors", "threshold": "high", "max_count": [1, 2]}
        ]))
        .unwrap();
        assert_eq!(target.checks, vec![CheckSpec::new("cpu_utilization").with_threshold(80.0)]);

        let bad_known = Target::from_value(json!([{"name": "crash_files", "max_count": [1, 2]}]));
        assert!(matches!(bad_known, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_target_passthrough_forms() {
        for value in [
            json!(null),
            json!([]),
            json!({"name": "health_check"}),
            json!({"name": "health_check", "vars": {}}),
            json!({"name": "health_check", "vars": {"checks": []}}),
        ] {
            assert!(Target::from_value(value).unwrap().is_empty());
        }
    }

    #[test]
    fn test_target_rejects_other_shapes() {
        for value in [
            json!({"name": "interface_check", "vars": {"checks": []}}),
            json!({"vars": {"checks": []}}),
            json!("cpu_utilization"),
            json!({"name": "health_check", "vars": {"checks": "uptime"}}),
            json!([{"threshold": 80}]),
        ] {
            assert!(matches!(Target::from_value(value), Err(Error::InvalidInput(_))));
        }
    }

    #[test]
    fn test_request_missing_fields() {
        let evaluator = HealthEvaluator::default();

        let request: EvaluateRequest = serde_json::from_value(json!({"target": []})).unwrap();
        assert!(matches!(evaluator.evaluate_request(request), Err(Error::InvalidInput(_))));

        let request: EvaluateRequest = serde_json::from_value(json!({"facts": {}})).unwrap();
        assert!(matches!(evaluator.evaluate_request(request), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_request_malformed_facts() {
        let evaluator = HealthEvaluator::default();
        let request = EvaluateRequest::new(json!(["cpu"]), json!([{"name": "uptime"}]));
        assert!(matches!(
            evaluator.evaluate_request(request),
            Err(Error::MalformedFacts { .. })
        ));
    }

    #[test]
    fn test_request_null_target_is_passthrough() {
        let request: EvaluateRequest =
            serde_json::from_value(json!({"health_facts": {"uptime": {"days": 2}}, "target": null})).unwrap();
        let report = HealthEvaluator::default().evaluate_request(request).unwrap();
        assert!(report.is_passthrough());
        assert_eq!(report.to_value().unwrap(), json!({"uptime": {"days": 2}}));
    }

    #[test]
    fn test_request_cpu_tiers() {
        let mut request = EvaluateRequest::new(
            json!({"cpu_usage": {"five_minute": 75}}),
            json!([{"name": "cpu_utilization"}]),
        );
        request.warning_threshold = Some(70.0);
        request.critical_threshold = Some(80.0);

        let report = HealthEvaluator::default().evaluate_request(request).unwrap();
        assert_eq!(report.result(), Some(Verdict::Warning));
    }

    #[test]
    fn test_wrapper_details_attach_facts() {
        let facts = RawFacts::from_value(json!({"crash_files": []})).unwrap();
        let target = Target::new(vec![CheckSpec::new("crash_files")]).with_details(true);
        let report = HealthEvaluator::default()
            .evaluate(&facts, &target, &EvaluateOptions::new())
            .unwrap();
        let report = report.as_health_report().unwrap();
        assert_eq!(report.details, Some(json!({"crash_files": []})));
        assert_eq!(report.result, Verdict::Pass);
    }
}
