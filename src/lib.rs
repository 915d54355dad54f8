//! # healthchecks
//!
//! Turns network-device health facts into a uniform PASS/FAIL/WARNING
//! report.
//!
//! Devices report the same health data in many shapes depending on vendor
//! and OS. This crate detects which shape is present, extracts one
//! canonical metric per family, judges each requested check against its
//! thresholds and folds the verdicts into an overall status.
//!
//! ## Architecture
//!
//! - **Normalize**: per-vendor shape detection into canonical metrics
//! - **Checks**: threshold rules and precedence per check
//! - **Report**: aggregation into one report keyed by check name
//! - **Config**: the default-threshold store
//!
//! ## Example
//!
//! ```rust
//! use healthchecks::prelude::*;
//! use serde_json::json;
//!
//! let facts = RawFacts::from_value(json!({"cpu_usage": {"five_minute": 50}}))?;
//! let target = Target::new(vec![CheckSpec::new("cpu_utilization").with_threshold(80.0)]);
//!
//! let report = HealthEvaluator::default().evaluate(&facts, &target, &EvaluateOptions::new())?;
//! assert_eq!(report.result(), Some(Verdict::Pass));
//! # Ok::<(), healthchecks::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod facts;
pub mod normalize;
pub mod report;
pub mod utils;
pub mod view;

pub use error::{Error, Result};
pub use view::evaluate;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::checks::{
        CheckKind, CheckOutcome, CheckResult, CheckSpec, EvaluateOptions, HealthEvaluator,
        SummaryBlock, Verdict,
    };
    pub use crate::config::{ThresholdDefaults, ThresholdKey};
    pub use crate::error::{Error, Result};
    pub use crate::facts::RawFacts;
    pub use crate::normalize::{CanonicalMetric, MetricFamily};
    pub use crate::report::{HealthReport, Report};
    pub use crate::view::{evaluate, EvaluateRequest, Target};
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
