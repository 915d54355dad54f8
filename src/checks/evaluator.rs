//! Check Evaluator.
//!
//! Turns one [`CheckSpec`] plus raw facts into a [`CheckOutcome`]. Each
//! check asks the normalizer for the single metric family it reads,
//! resolves its thresholds, and judges. Thresholds are resolved before the
//! facts are inspected, so an unresolvable threshold is an error even when
//! the device reported nothing for that family.

use std::sync::Arc;

use super::result::{CheckOutcome, CheckResult, SummaryBlock, Verdict};
use super::spec::{CheckKind, CheckSpec};
use super::thresholds::ThresholdResolver;
use crate::config::{self, ThresholdDefaults, ThresholdKey};
use crate::error::{Error, Result};
use crate::facts::RawFacts;
use crate::normalize::{self, cpu, crash, environment, filesystem, memory, neighbors, uptime, Protocol};
use crate::utils::constants::*;

/// Error payload for an unusable filesystem section
pub const INVALID_FILESYSTEM_DATA: &str = "Invalid filesystem data";

/// Error payload when no environment section exists
pub const INVALID_ENVIRONMENT_DATA: &str = "Invalid environment data";

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Call-level options
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvaluateOptions {
    /// Attach the raw facts to the report
    pub details: bool,
    /// CPU warning tier for checks that set none
    pub warning_threshold: Option<f64>,
    /// CPU critical tier for checks that set none
    pub critical_threshold: Option<f64>,
}

impl EvaluateOptions {
    /// Options with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the raw facts to the report
    pub fn with_details(mut self, details: bool) -> Self {
        self.details = details;
        self
    }

    /// Call-level CPU tiers
    pub fn with_cpu_tiers(mut self, warning: f64, critical: f64) -> Self {
        self.warning_threshold = Some(warning);
        self.critical_threshold = Some(critical);
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HEALTH EVALUATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Evaluates checks against facts using an injected default-threshold store
#[derive(Debug, Clone)]
pub struct HealthEvaluator {
    defaults: Arc<ThresholdDefaults>,
}

impl Default for HealthEvaluator {
    fn default() -> Self {
        Self::with_defaults(ThresholdDefaults::builtin())
    }
}

impl HealthEvaluator {
    /// Create an evaluator over a shared default store
    pub fn new(defaults: Arc<ThresholdDefaults>) -> Self {
        Self { defaults }
    }

    /// Create an evaluator that owns its default store
    pub fn with_defaults(defaults: ThresholdDefaults) -> Self {
        Self::new(Arc::new(defaults))
    }

    /// Evaluator over the process-wide default store
    pub fn global() -> Self {
        Self::new(config::global())
    }

    /// Default store in use
    pub fn defaults(&self) -> &ThresholdDefaults {
        &self.defaults
    }

    /// Evaluate one check.
    ///
    /// Returns `Ok(None)` for unrecognized check names.
    pub fn evaluate_check(
        &self,
        facts: &RawFacts,
        check: &CheckSpec,
        options: &EvaluateOptions,
    ) -> Result<Option<CheckOutcome>> {
        let Some(kind) = check.kind() else {
            tracing::debug!(check = %check.name, "skipping unrecognized check");
            return Ok(None);
        };

        let resolver = ThresholdResolver::new(&check.name, facts, &self.defaults);
        let name = check.name.as_str();

        let outcome: CheckOutcome = match kind {
            CheckKind::CpuUtilization => cpu_utilization(name, facts, check, options, &resolver)?.into(),
            CheckKind::CpuStatusSummary => cpu_summary(name, facts).into(),
            CheckKind::MemoryUtilization => {
                let limit = resolver.resolve(ThresholdKey::MemoryUtilizationThreshold, check.threshold, None, None)?;
                let current = memory::normalize(facts).utilization_percent();
                CheckResult::new(name, Verdict::at_most(current, limit.value))
                    .measure("current_utilization", current)
                    .measure("threshold", limit.value)
                    .into()
            }
            CheckKind::MemoryStatusSummary => memory_summary(name, facts).into(),
            CheckKind::MemoryFree => {
                let minimum = resolver.resolve(ThresholdKey::MemoryFreeThreshold, check.min_free, None, None)?;
                let current = memory::normalize(facts).free_mb;
                CheckResult::new(name, Verdict::at_least(current, minimum.value))
                    .measure("current_free", current)
                    .measure("min_free", minimum.value)
                    .into()
            }
            CheckKind::MemoryBuffers => {
                let minimum = resolver.resolve(ThresholdKey::MemoryBuffersThreshold, check.min_buffers, None, None)?;
                let current = memory::normalize(facts).buffers_mb;
                CheckResult::new(name, Verdict::at_least(current, minimum.value))
                    .measure("current_buffers", current)
                    .measure("min_buffers", minimum.value)
                    .into()
            }
            CheckKind::MemoryCache => {
                let minimum = resolver.resolve(ThresholdKey::MemoryCacheThreshold, check.min_cache, None, None)?;
                let current = memory::normalize(facts).cache_mb;
                CheckResult::new(name, Verdict::at_least(current, minimum.value))
                    .measure("current_cache", current)
                    .measure("min_cache", minimum.value)
                    .into()
            }
            CheckKind::Uptime => {
                let minimum = resolver.or_fixed(check.min_uptime, DEFAULT_MIN_UPTIME_MINUTES);
                let current = uptime::normalize(facts).total_minutes;
                CheckResult::new(name, Verdict::at_least(current, minimum.value))
                    .measure("current_uptime", current)
                    .measure("min_uptime", minimum.value)
                    .into()
            }
            CheckKind::UptimeStatusSummary => uptime_summary(name, facts).into(),
            CheckKind::CrashFiles => {
                let maximum = resolver.or_fixed(check.max_count, DEFAULT_MAX_CRASH_FILES);
                let current = crash::normalize(facts).count() as f64;
                CheckResult::new(name, Verdict::at_most(current, maximum.value))
                    .measure("current_count", current)
                    .measure("max_count", maximum.value)
                    .into()
            }
            CheckKind::CrashFilesSummary => {
                let crashes = crash::normalize(facts);
                SummaryBlock::new(name)
                    .measure("count", crashes.count() as f64)
                    .with_value("files", crashes.files)
                    .into()
            }
            CheckKind::FilesystemUtilization => {
                let limit = resolver.or_fixed(check.threshold, DEFAULT_FILESYSTEM_UTILIZATION);
                let current = filesystem::used_percent(facts);
                CheckResult::new(name, Verdict::at_most(current, limit.value))
                    .measure("current_utilization", current)
                    .measure("threshold", limit.value)
                    .into()
            }
            CheckKind::FilesystemFree => filesystem_free(name, facts, check, &resolver)?.into(),
            CheckKind::EnvironmentStatus => environment_status(name, facts, check, &resolver)?.into(),
            CheckKind::MinNeighborsUp | CheckKind::OspfNeighbors => {
                let minimum = resolver.or_fixed(check.min_count, DEFAULT_MIN_NEIGHBORS_UP);
                let protocol = match kind {
                    CheckKind::OspfNeighbors => Protocol::Ospf,
                    _ => Protocol::Bgp,
                };
                let table = neighbors::normalize(facts, protocol);
                CheckResult::new(name, Verdict::at_least(table.up_count as f64, minimum.value))
                    .measure("up_count", table.up_count as f64)
                    .measure("min_count", minimum.value)
                    .measure("total_count", table.total_count as f64)
                    .measure("down_count", table.down_count as f64)
                    .into()
            }
            CheckKind::AllNeighborsUp | CheckKind::AllNeighborsDown => {
                let table = neighbors::normalize(facts, Protocol::Bgp);
                let ok = match kind {
                    CheckKind::AllNeighborsUp => table.up_count == table.total_count,
                    _ => table.down_count == table.total_count,
                };
                let offending: Vec<_> = match kind {
                    CheckKind::AllNeighborsUp => table.down_neighbors().collect(),
                    _ => table.up_neighbors().collect(),
                };
                let offending = serde_json::to_value(offending).map_err(serialization)?;
                CheckResult::new(name, Verdict::from_bool(ok))
                    .measure("up_count", table.up_count as f64)
                    .measure("down_count", table.down_count as f64)
                    .measure("total_count", table.total_count as f64)
                    .with_value("neighbors", offending)
                    .into()
            }
            CheckKind::BgpStatusSummary => {
                let table = neighbors::normalize(facts, Protocol::Bgp);
                SummaryBlock::new(name)
                    .measure("up_count", table.up_count as f64)
                    .measure("down_count", table.down_count as f64)
                    .measure("total_count", table.total_count as f64)
                    .with_value("neighbors", serde_json::to_value(&table.neighbors).map_err(serialization)?)
                    .into()
            }
        };

        let outcome = match outcome {
            CheckOutcome::Check(result) => {
                let details = if check.details {
                    Some(serde_json::to_value(normalize::normalize(facts, kind.family())).map_err(serialization)?)
                } else {
                    None
                };
                let result = result
                    .contributing(!check.ignore_errors || kind.always_contributes())
                    .with_details(details);
                tracing::debug!(
                    check = name,
                    verdict = %result.verdict,
                    contributes = result.contributes,
                    "evaluated check"
                );
                CheckOutcome::Check(result)
            }
            summary => summary,
        };

        Ok(Some(outcome))
    }
}

fn serialization(e: serde_json::Error) -> Error {
    Error::Serialization(e.to_string())
}

// ═══════════════════════════════════════════════════════════════════════════════
// CPU
// ═══════════════════════════════════════════════════════════════════════════════

fn cpu_utilization(
    name: &str,
    facts: &RawFacts,
    check: &CheckSpec,
    options: &EvaluateOptions,
    resolver: &ThresholdResolver<'_>,
) -> Result<CheckResult> {
    // An explicit ceiling turns the check into a plain two-tier comparison
    if let Some(threshold) = check.threshold {
        let cpu = cpu::normalize(facts);
        return Ok(CheckResult::new(name, Verdict::at_most(cpu.current_utilization, threshold))
            .measure("current_utilization", cpu.current_utilization)
            .measure("five_min_avg", cpu.five_min_avg)
            .measure("threshold", threshold));
    }

    let warning = resolver.resolve(
        ThresholdKey::CpuWarningThreshold,
        check.warning_threshold,
        options.warning_threshold,
        None,
    )?;
    let critical = resolver.resolve(
        ThresholdKey::CpuCriticalThreshold,
        check.critical_threshold,
        options.critical_threshold,
        None,
    )?;

    let cpu = cpu::normalize(facts);
    Ok(
        CheckResult::new(name, Verdict::tiered(cpu.current_utilization, warning.value, critical.value))
            .measure("current_utilization", cpu.current_utilization)
            .measure("five_min_avg", cpu.five_min_avg)
            .measure("warning_threshold", warning.value)
            .measure("critical_threshold", critical.value),
    )
}

fn cpu_summary(name: &str, facts: &RawFacts) -> SummaryBlock {
    let cpu = cpu::normalize(facts);
    let mut summary = SummaryBlock::new(name)
        .measure("current_utilization", cpu.current_utilization)
        .measure("five_min_avg", cpu.five_min_avg);
    if let Some(one) = cpu.one_min_avg {
        summary = summary.measure("one_min_avg", one);
    }
    if let Some(five_sec) = cpu.five_sec_avg {
        summary = summary.measure("five_sec_avg", five_sec);
    }
    summary
}

// ═══════════════════════════════════════════════════════════════════════════════
// MEMORY / UPTIME
// ═══════════════════════════════════════════════════════════════════════════════

fn memory_summary(name: &str, facts: &RawFacts) -> SummaryBlock {
    let memory = memory::normalize(facts);
    SummaryBlock::new(name)
        .measure("total_mb", memory.total_mb)
        .measure("used_mb", memory.used_mb)
        .measure("free_mb", memory.free_mb)
        .measure("buffers_mb", memory.buffers_mb)
        .measure("cache_mb", memory.cache_mb)
        .measure("utilization_percent", memory.utilization_percent_precise())
}

fn uptime_summary(name: &str, facts: &RawFacts) -> SummaryBlock {
    let total = uptime::normalize(facts).total_minutes;
    let whole = if total > 0.0 { total as u64 } else { 0 };
    SummaryBlock::new(name)
        .measure("total_minutes", total)
        .with_value("days", whole / MINUTES_PER_DAY)
        .with_value("hours", (whole % MINUTES_PER_DAY) / MINUTES_PER_HOUR)
        .with_value("minutes", whole % MINUTES_PER_HOUR)
}

// ═══════════════════════════════════════════════════════════════════════════════
// FILESYSTEM
// ═══════════════════════════════════════════════════════════════════════════════

fn filesystem_free(
    name: &str,
    facts: &RawFacts,
    check: &CheckSpec,
    resolver: &ThresholdResolver<'_>,
) -> Result<CheckResult> {
    let minimum = resolver.resolve(
        ThresholdKey::FilesystemFreeThreshold,
        check.filesystem_free_threshold.or(check.threshold),
        None,
        None,
    )?;

    let Some(fs) = filesystem::normalize(facts) else {
        return Ok(CheckResult::new(name, Verdict::Fail)
            .with_value("error", INVALID_FILESYSTEM_DATA)
            .measure("threshold", minimum.value));
    };

    Ok(CheckResult::new(name, Verdict::at_least(fs.free_percent, minimum.value))
        .measure("free_percent", fs.free_percent)
        .measure("threshold", minimum.value)
        .measure("total", fs.total)
        .measure("free", fs.free))
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENVIRONMENT
// ═══════════════════════════════════════════════════════════════════════════════

fn environment_status(
    name: &str,
    facts: &RawFacts,
    check: &CheckSpec,
    resolver: &ThresholdResolver<'_>,
) -> Result<CheckResult> {
    let Some(env) = environment::normalize(facts) else {
        return Ok(CheckResult::new(name, Verdict::Fail).with_value("error", INVALID_ENVIRONMENT_DATA));
    };

    let mut values = Vec::new();
    let temperature = match env.temperature {
        Some(current) => {
            let limit = resolver.resolve(
                ThresholdKey::EnvironmentTempThreshold,
                check.temp_threshold.or(check.threshold),
                None,
                env.embedded_threshold,
            )?;
            values.push(("temperature", current));
            values.push(("temp_threshold", limit.value));
            Verdict::from_bool(current <= limit.value)
        }
        None => Verdict::Pass,
    };

    let failed_fans = env.failed_fans();
    let failed_power = env.failed_power();
    let fans = Verdict::from_bool(failed_fans.is_empty());
    let power = Verdict::from_bool(failed_power.is_empty());
    let failed_fans = serde_json::to_value(failed_fans).map_err(serialization)?;
    let failed_power = serde_json::to_value(failed_power).map_err(serialization)?;

    let mut result = CheckResult::new(name, Verdict::worst([temperature, fans, power]))
        .with_value("temperature_status", temperature.as_str())
        .with_value("fan_status", fans.as_str())
        .with_value("power_status", power.as_str());
    for (key, value) in values {
        result = result.measure(key, value);
    }
    if fans == Verdict::Fail {
        result = result.with_value("failed_fans", failed_fans);
    }
    if power == Verdict::Fail {
        result = result.with_value("failed_power", failed_power);
    }
    Ok(result)
}
