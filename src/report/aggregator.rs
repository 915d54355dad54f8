//! Folds check outcomes into one report.

use serde_json::Value;
use std::collections::BTreeMap;

use super::HealthReport;
use crate::checks::{CheckOutcome, Verdict};

/// Accumulates outcomes in evaluation order
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    outcomes: BTreeMap<String, CheckOutcome>,
    details: Option<Value>,
}

impl ReportBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an outcome; a later outcome replaces an earlier one of the same name
    pub fn push(&mut self, outcome: CheckOutcome) {
        let name = outcome.name().to_string();
        if let Some(previous) = self.outcomes.insert(name, outcome) {
            tracing::debug!(check = previous.name(), "check overwritten by a later entry");
        }
    }

    /// Attach a top-level `details` block
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Number of distinct outcomes so far
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether nothing has been pushed
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Compute the overall status from the surviving outcomes and build the report
    pub fn finish(self) -> HealthReport {
        let result = Verdict::worst(
            self.outcomes
                .values()
                .filter_map(CheckOutcome::contributing_verdict),
        );

        tracing::debug!(checks = self.outcomes.len(), result = %result, "aggregated report");

        HealthReport {
            result,
            checks: self.outcomes,
            details: self.details,
        }
    }
}

impl Extend<CheckOutcome> for ReportBuilder {
    fn extend<I: IntoIterator<Item = CheckOutcome>>(&mut self, iter: I) {
        for outcome in iter {
            self.push(outcome);
        }
    }
}

/// Aggregate outcomes with no details block
pub fn aggregate<I: IntoIterator<Item = CheckOutcome>>(outcomes: I) -> HealthReport {
    let mut builder = ReportBuilder::new();
    builder.extend(outcomes);
    builder.finish()
}
