//! Check Evaluator.
//!
//! Judges canonical metrics against thresholds. Every recognized check has
//! one rule and one threshold chain; see [`CheckKind`] for the closed set
//! and [`thresholds`] for precedence.

pub mod evaluator;
pub mod result;
pub mod spec;
pub mod thresholds;

pub use evaluator::{EvaluateOptions, HealthEvaluator, INVALID_ENVIRONMENT_DATA, INVALID_FILESYSTEM_DATA};
pub use result::{CheckOutcome, CheckResult, SummaryBlock, Verdict};
pub use spec::{CheckKind, CheckSpec};
pub use thresholds::{Resolved, ThresholdResolver, ThresholdSource};
