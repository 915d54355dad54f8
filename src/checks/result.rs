//! Verdicts and per-check result records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::utils::math::to_json_number;

// ═══════════════════════════════════════════════════════════════════════════════
// VERDICT
// ═══════════════════════════════════════════════════════════════════════════════

/// Outcome of one check, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// Within limits
    Pass,
    /// Above the warning tier but below the critical one
    Warning,
    /// Outside limits
    Fail,
}

impl Verdict {
    /// Display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Warning => "WARNING",
            Verdict::Fail => "FAIL",
        }
    }

    /// PASS when the condition holds, FAIL otherwise
    pub fn from_bool(ok: bool) -> Self {
        if ok {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    /// `current ≤ limit`
    pub fn at_most(current: f64, limit: f64) -> Self {
        Self::from_bool(current <= limit)
    }

    /// `current ≥ minimum`
    pub fn at_least(current: f64, minimum: f64) -> Self {
        Self::from_bool(current >= minimum)
    }

    /// Three-tier verdict: FAIL at or above `critical`, WARNING at or above
    /// `warning`, PASS below both
    pub fn tiered(current: f64, warning: f64, critical: f64) -> Self {
        if current >= critical {
            Verdict::Fail
        } else if current >= warning {
            Verdict::Warning
        } else {
            Verdict::Pass
        }
    }

    /// Fold a sequence of verdicts into the most severe one (PASS when empty)
    pub fn worst<I: IntoIterator<Item = Verdict>>(verdicts: I) -> Self {
        verdicts.into_iter().max().unwrap_or(Verdict::Pass)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Verdict {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PASS" => Ok(Verdict::Pass),
            "WARNING" | "WARN" => Ok(Verdict::Warning),
            "FAIL" => Ok(Verdict::Fail),
            _ => Err(crate::error::Error::InvalidInput(format!("Unknown verdict: {}", s))),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHECK RESULT
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of one judged check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    /// Check name, the report key
    #[serde(skip)]
    pub name: String,
    /// Verdict
    #[serde(rename = "check_status")]
    pub verdict: Verdict,
    /// Measured values and thresholds used
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
    /// Canonical metric the check was judged on, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Whether the verdict feeds the overall status
    #[serde(skip)]
    pub contributes: bool,
}

impl CheckResult {
    /// Create a contributing result with no values yet
    pub fn new(name: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            name: name.into(),
            verdict,
            values: BTreeMap::new(),
            details: None,
            contributes: true,
        }
    }

    /// Record a measured value or threshold
    pub fn measure(mut self, key: &str, value: f64) -> Self {
        self.values.insert(key.to_string(), to_json_number(value));
        self
    }

    /// Record any other value
    pub fn with_value(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    /// Attach details
    pub fn with_details(mut self, details: Option<Value>) -> Self {
        self.details = details;
        self
    }

    /// Set whether the verdict feeds the overall status
    pub fn contributing(mut self, contributes: bool) -> Self {
        self.contributes = contributes;
        self
    }

    /// Value recorded under a key
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SUMMARY BLOCK
// ═══════════════════════════════════════════════════════════════════════════════

/// Data-only block produced by `*_summary` checks; never judged
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryBlock {
    /// Check name, the report key
    #[serde(skip)]
    pub name: String,
    /// Summary values
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

impl SummaryBlock {
    /// Create an empty summary
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Record a number
    pub fn measure(mut self, key: &str, value: f64) -> Self {
        self.values.insert(key.to_string(), to_json_number(value));
        self
    }

    /// Record any other value
    pub fn with_value(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    /// Value recorded under a key
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHECK OUTCOME
// ═══════════════════════════════════════════════════════════════════════════════

/// What one executed check contributes to the report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CheckOutcome {
    /// Judged check
    Check(CheckResult),
    /// Data-only summary
    Summary(SummaryBlock),
}

impl CheckOutcome {
    /// Report key
    pub fn name(&self) -> &str {
        match self {
            CheckOutcome::Check(result) => &result.name,
            CheckOutcome::Summary(summary) => &summary.name,
        }
    }

    /// Verdict, if judged
    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            CheckOutcome::Check(result) => Some(result.verdict),
            CheckOutcome::Summary(_) => None,
        }
    }

    /// Verdict that feeds the overall status, if any
    pub fn contributing_verdict(&self) -> Option<Verdict> {
        match self {
            CheckOutcome::Check(result) if result.contributes => Some(result.verdict),
            _ => None,
        }
    }

    /// Judged result, if this is one
    pub fn as_check(&self) -> Option<&CheckResult> {
        match self {
            CheckOutcome::Check(result) => Some(result),
            CheckOutcome::Summary(_) => None,
        }
    }

    /// Summary block, if this is one
    pub fn as_summary(&self) -> Option<&SummaryBlock> {
        match self {
            CheckOutcome::Summary(summary) => Some(summary),
            CheckOutcome::Check(_) => None,
        }
    }
}

impl From<CheckResult> for CheckOutcome {
    fn from(result: CheckResult) -> Self {
        CheckOutcome::Check(result)
    }
}

impl From<SummaryBlock> for CheckOutcome {
    fn from(summary: SummaryBlock) -> Self {
        CheckOutcome::Summary(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verdict_boundaries() {
        assert_eq!(Verdict::at_most(80.0, 80.0), Verdict::Pass);
        assert_eq!(Verdict::at_most(80.5, 80.0), Verdict::Fail);
        assert_eq!(Verdict::at_least(100.0, 100.0), Verdict::Pass);
        assert_eq!(Verdict::at_least(99.0, 100.0), Verdict::Fail);
    }

    #[test]
    fn test_tiered_boundaries() {
        assert_eq!(Verdict::tiered(84.0, 85.0, 95.0), Verdict::Pass);
        assert_eq!(Verdict::tiered(85.0, 85.0, 95.0), Verdict::Warning);
        assert_eq!(Verdict::tiered(94.0, 85.0, 95.0), Verdict::Warning);
        assert_eq!(Verdict::tiered(95.0, 85.0, 95.0), Verdict::Fail);
    }

    #[test]
    fn test_worst() {
        assert_eq!(Verdict::worst(Vec::new()), Verdict::Pass);
        assert_eq!(Verdict::worst([Verdict::Pass, Verdict::Warning]), Verdict::Warning);
        assert_eq!(
            Verdict::worst([Verdict::Warning, Verdict::Fail, Verdict::Pass]),
            Verdict::Fail
        );
    }

    #[test]
    fn test_verdict_parse() {
        assert_eq!("pass".parse::<Verdict>().unwrap(), Verdict::Pass);
        assert_eq!("WARN".parse::<Verdict>().unwrap(), Verdict::Warning);
        assert!("unPASS".parse::<Verdict>().is_err());
    }

    #[test]
    fn test_check_result_serialization() {
        let result = CheckResult::new("cpu_utilization", Verdict::Pass)
            .measure("current_utilization", 50.0)
            .measure("threshold", 80.0);

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"check_status": "PASS", "current_utilization": 50, "threshold": 80})
        );
    }

    #[test]
    fn test_outcome_contribution() {
        let ignored = CheckOutcome::from(
            CheckResult::new("crash_files", Verdict::Fail).contributing(false),
        );
        assert_eq!(ignored.verdict(), Some(Verdict::Fail));
        assert_eq!(ignored.contributing_verdict(), None);

        let summary = CheckOutcome::from(SummaryBlock::new("crash_files_summary").measure("count", 2.0));
        assert_eq!(summary.verdict(), None);
        assert_eq!(serde_json::to_value(&summary).unwrap(), json!({"count": 2}));
    }
}
