//! Default-threshold configuration.
//!
//! [`ThresholdDefaults`] is the external key/value store of fallback
//! thresholds. It is injected into [`crate::checks::HealthEvaluator`];
//! [`init`] and [`global`] exist for callers that want one process-wide
//! table loaded at startup (the binaries, and the free
//! [`crate::evaluate`] function).

pub mod thresholds;

pub use thresholds::{ThresholdDefaults, ThresholdKey, ENV_PREFIX};

use std::sync::{Arc, OnceLock};

use crate::error::{Error, Result};

static DEFAULTS: OnceLock<Arc<ThresholdDefaults>> = OnceLock::new();

/// Install the process-wide default table.
///
/// Must run before the first evaluation that relies on [`global`]; a second
/// call, or a call after [`global`] already fell back to the built-in
/// table, is a configuration error.
pub fn init(defaults: ThresholdDefaults) -> Result<Arc<ThresholdDefaults>> {
    defaults.validate()?;
    let defaults = Arc::new(defaults);
    DEFAULTS
        .set(Arc::clone(&defaults))
        .map_err(|_| Error::Config("default thresholds already initialized".into()))?;
    tracing::debug!(keys = defaults.len(), "installed process-wide default thresholds");
    Ok(defaults)
}

/// Process-wide default table, the built-in one if [`init`] never ran
pub fn global() -> Arc<ThresholdDefaults> {
    Arc::clone(DEFAULTS.get_or_init(|| Arc::new(ThresholdDefaults::builtin())))
}

/// Whether the process-wide table has been set (explicitly or by fallback)
pub fn is_initialized() -> bool {
    DEFAULTS.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global is process-wide, so a single test exercises its lifecycle.
    #[test]
    fn test_global_lifecycle() {
        let installed = init(ThresholdDefaults::builtin().with(ThresholdKey::FilesystemFreeThreshold, 10.0));
        let current = global();

        match installed {
            Ok(defaults) => assert_eq!(*defaults, *current),
            Err(err) => assert!(matches!(err, Error::Config(_))),
        }
        assert!(is_initialized());
        assert!(matches!(init(ThresholdDefaults::builtin()), Err(Error::Config(_))));
    }

    #[test]
    fn test_init_rejects_invalid_table() {
        let invalid = ThresholdDefaults::empty()
            .with(ThresholdKey::CpuWarningThreshold, 99.0)
            .with(ThresholdKey::CpuCriticalThreshold, 90.0);
        assert!(matches!(init(invalid), Err(Error::Config(_))));
    }
}
