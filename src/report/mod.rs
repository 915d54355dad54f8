//! Report Aggregator.
//!
//! A report is either the evaluated form, keyed by check name with an
//! overall `result`, or the raw facts unchanged when no checks were
//! requested. Both serialize as a single flat JSON object.

pub mod aggregator;

pub use aggregator::{aggregate, ReportBuilder};

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::checks::{CheckOutcome, CheckResult, Verdict};
use crate::error::{Error, Result};
use crate::facts::RawFacts;

// ═══════════════════════════════════════════════════════════════════════════════
// HEALTH REPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// Evaluated report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    /// Overall status
    pub result: Verdict,
    /// Outcomes keyed by check name
    #[serde(flatten)]
    pub checks: BTreeMap<String, CheckOutcome>,
    /// Raw facts, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl HealthReport {
    /// Outcome recorded under a check name
    pub fn get(&self, name: &str) -> Option<&CheckOutcome> {
        self.checks.get(name)
    }

    /// Judged result recorded under a check name
    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.get(name).and_then(CheckOutcome::as_check)
    }

    /// Judged results that did not pass, contributing or not
    pub fn failures(&self) -> Vec<&CheckResult> {
        self.checks
            .values()
            .filter_map(CheckOutcome::as_check)
            .filter(|result| result.verdict != Verdict::Pass)
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// What an evaluation returns
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    /// Checks were evaluated
    Evaluated(HealthReport),
    /// No checks requested; the facts are returned as given
    Passthrough(RawFacts),
}

impl Report {
    /// Overall status, if checks were evaluated
    pub fn result(&self) -> Option<Verdict> {
        match self {
            Report::Evaluated(report) => Some(report.result),
            Report::Passthrough(_) => None,
        }
    }

    /// Whether this is a passthrough report
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Report::Passthrough(_))
    }

    /// Evaluated report, if any
    pub fn as_health_report(&self) -> Option<&HealthReport> {
        match self {
            Report::Evaluated(report) => Some(report),
            Report::Passthrough(_) => None,
        }
    }

    /// Convert to a JSON value
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Serialize to compact JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Serialize to indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }
}

impl From<HealthReport> for Report {
    fn from(report: HealthReport) -> Self {
        Report::Evaluated(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::SummaryBlock;
    use serde_json::json;

    #[test]
    fn test_evaluated_serialization_is_flat() {
        let report = Report::from(aggregate([
            CheckResult::new("crash_files", Verdict::Fail)
                .measure("current_count", 2.0)
                .measure("max_count", 0.0)
                .into(),
            SummaryBlock::new("crash_files_summary")
                .measure("count", 2.0)
                .into(),
        ]));

        assert_eq!(
            report.to_value().unwrap(),
            json!({
                "result": "FAIL",
                "crash_files": {"check_status": "FAIL", "current_count": 2, "max_count": 0},
                "crash_files_summary": {"count": 2}
            })
        );
        assert_eq!(report.result(), Some(Verdict::Fail));
        assert_eq!(report.as_health_report().unwrap().failures().len(), 1);
    }

    #[test]
    fn test_passthrough_serializes_as_facts() {
        let facts = RawFacts::from_value(json!({"cpu": {"15_min_avg": 3}})).unwrap();
        let report = Report::Passthrough(facts.clone());
        assert!(report.is_passthrough());
        assert_eq!(report.result(), None);
        assert_eq!(report.to_value().unwrap(), facts.to_value());
    }

    #[test]
    fn test_details_block() {
        let report = ReportBuilder::new().with_details(json!({"uptime": {}})).finish();
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"result": "PASS", "details": {"uptime": {}}})
        );
    }
}
