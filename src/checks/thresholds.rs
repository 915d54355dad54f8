//! Threshold precedence.
//!
//! A threshold is taken from the first source that has it:
//!
//! 1. the check itself
//! 2. the call-site argument (CPU warning/critical tiers only)
//! 3. the facts' `thresholds` mapping, keyed like the default store
//! 4. a value the fact shape itself embeds (e.g. `temperature.threshold`)
//! 5. the default store
//!
//! Nothing found is [`Error::MissingThreshold`]. Checks with a fixed
//! default never reach the error and use [`ThresholdResolver::or_fixed`].

use serde::{Deserialize, Serialize};

use crate::config::{ThresholdDefaults, ThresholdKey};
use crate::error::{Error, Result};
use crate::facts::RawFacts;

/// Where a resolved threshold came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSource {
    /// Set on the check
    Check,
    /// Passed with the call
    Argument,
    /// The facts' `thresholds` mapping
    Facts,
    /// Reported by the device alongside the reading
    Embedded,
    /// Default store
    Defaults,
    /// Fixed default of the check
    Fixed,
}

/// A threshold and its origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    /// Value
    pub value: f64,
    /// Origin
    pub source: ThresholdSource,
}

/// Resolves thresholds for one check against one set of facts
#[derive(Debug, Clone, Copy)]
pub struct ThresholdResolver<'a> {
    check: &'a str,
    facts: &'a RawFacts,
    defaults: &'a ThresholdDefaults,
}

impl<'a> ThresholdResolver<'a> {
    /// Create a resolver
    pub fn new(check: &'a str, facts: &'a RawFacts, defaults: &'a ThresholdDefaults) -> Self {
        Self {
            check,
            facts,
            defaults,
        }
    }

    /// Walk the full chain for a store-backed threshold
    pub fn resolve(
        &self,
        key: ThresholdKey,
        explicit: Option<f64>,
        argument: Option<f64>,
        embedded: Option<f64>,
    ) -> Result<Resolved> {
        let candidates = [
            (explicit, ThresholdSource::Check),
            (argument, ThresholdSource::Argument),
            (self.facts.embedded_threshold(key.as_str()), ThresholdSource::Facts),
            (embedded, ThresholdSource::Embedded),
            (self.defaults.get(key), ThresholdSource::Defaults),
        ];

        let resolved = candidates
            .into_iter()
            .find_map(|(value, source)| value.map(|value| Resolved { value, source }))
            .ok_or_else(|| Error::missing_threshold(self.check, key.as_str()))?;

        tracing::debug!(
            check = self.check,
            key = key.as_str(),
            value = resolved.value,
            source = ?resolved.source,
            "resolved threshold"
        );
        Ok(resolved)
    }

    /// Threshold with a fixed default: the check's value, else `fixed`
    pub fn or_fixed(&self, explicit: Option<f64>, fixed: f64) -> Resolved {
        match explicit {
            Some(value) => Resolved {
                value,
                source: ThresholdSource::Check,
            },
            None => Resolved {
                value: fixed,
                source: ThresholdSource::Fixed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn facts_with_thresholds() -> RawFacts {
        RawFacts::from_value(json!({
            "thresholds": {"cpu_warning_threshold": 70, "filesystem_free_threshold": "15"}
        }))
        .unwrap()
    }

    #[test]
    fn test_precedence_order() {
        let facts = facts_with_thresholds();
        let defaults = ThresholdDefaults::builtin();
        let resolver = ThresholdResolver::new("cpu_utilization", &facts, &defaults);
        let key = ThresholdKey::CpuWarningThreshold;

        let r = resolver.resolve(key, Some(60.0), Some(65.0), None).unwrap();
        assert_eq!((r.value, r.source), (60.0, ThresholdSource::Check));

        let r = resolver.resolve(key, None, Some(65.0), None).unwrap();
        assert_eq!((r.value, r.source), (65.0, ThresholdSource::Argument));

        let r = resolver.resolve(key, None, None, Some(50.0)).unwrap();
        assert_eq!((r.value, r.source), (70.0, ThresholdSource::Facts));

        let r = resolver
            .resolve(ThresholdKey::CpuCriticalThreshold, None, None, None)
            .unwrap();
        assert_eq!((r.value, r.source), (95.0, ThresholdSource::Defaults));
    }

    #[test]
    fn test_embedded_beats_store() {
        let facts = RawFacts::default();
        let defaults = ThresholdDefaults::empty().with(ThresholdKey::EnvironmentTempThreshold, 60.0);
        let resolver = ThresholdResolver::new("environment_status", &facts, &defaults);

        let r = resolver
            .resolve(ThresholdKey::EnvironmentTempThreshold, None, None, Some(75.0))
            .unwrap();
        assert_eq!((r.value, r.source), (75.0, ThresholdSource::Embedded));
    }

    #[test]
    fn test_numeric_string_in_facts() {
        let facts = facts_with_thresholds();
        let defaults = ThresholdDefaults::empty();
        let resolver = ThresholdResolver::new("filesystem_status_summary", &facts, &defaults);

        let r = resolver
            .resolve(ThresholdKey::FilesystemFreeThreshold, None, None, None)
            .unwrap();
        assert_eq!(r.value, 15.0);
    }

    #[test]
    fn test_missing_everywhere() {
        let facts = RawFacts::default();
        let defaults = ThresholdDefaults::builtin();
        let resolver = ThresholdResolver::new("filesystem_status_summary", &facts, &defaults);

        let err = resolver
            .resolve(ThresholdKey::FilesystemFreeThreshold, None, None, None)
            .unwrap_err();
        assert_eq!(
            err,
            Error::missing_threshold("filesystem_status_summary", "filesystem_free_threshold")
        );
    }

    #[test]
    fn test_fixed_default() {
        let facts = RawFacts::default();
        let defaults = ThresholdDefaults::empty();
        let resolver = ThresholdResolver::new("uptime", &facts, &defaults);

        assert_eq!(resolver.or_fixed(None, 1440.0).source, ThresholdSource::Fixed);
        assert_eq!(resolver.or_fixed(Some(60.0), 1440.0).value, 60.0);
    }
}
