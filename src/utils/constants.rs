//! Constants shared by the normalizer and the evaluator.
//!
//! Unit conversions and the fixed per-check defaults live here for easy
//! auditing. Thresholds that come from the external defaults store are keyed
//! in [`crate::config::ThresholdKey`], not here.

// ═══════════════════════════════════════════════════════════════════════════════
// UNIT CONVERSIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Bytes per megabyte (1 MB = 1,048,576 bytes)
pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// Minutes per hour
pub const MINUTES_PER_HOUR: u64 = 60;

/// Minutes per day
pub const MINUTES_PER_DAY: u64 = 24 * MINUTES_PER_HOUR;

/// Minutes per week
pub const MINUTES_PER_WEEK: u64 = 7 * MINUTES_PER_DAY;

// ═══════════════════════════════════════════════════════════════════════════════
// FIXED CHECK DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Minimum uptime in minutes when the check sets none (24 hours)
pub const DEFAULT_MIN_UPTIME_MINUTES: f64 = 1440.0;

/// Maximum crash files tolerated when the check sets none
pub const DEFAULT_MAX_CRASH_FILES: f64 = 0.0;

/// Minimum neighbors in the up state when the check sets none
pub const DEFAULT_MIN_NEIGHBORS_UP: f64 = 1.0;

/// Filesystem utilization ceiling (percent) when the check sets none
pub const DEFAULT_FILESYSTEM_UTILIZATION: f64 = 80.0;

// ═══════════════════════════════════════════════════════════════════════════════
// BUILT-IN DEFAULT STORE VALUES
// ═══════════════════════════════════════════════════════════════════════════════

/// CPU utilization warning tier (percent)
pub const BUILTIN_CPU_WARNING: f64 = 85.0;

/// CPU utilization critical tier (percent)
pub const BUILTIN_CPU_CRITICAL: f64 = 95.0;

/// Memory utilization ceiling (percent)
pub const BUILTIN_MEMORY_UTILIZATION: f64 = 80.0;

/// Minimum free memory (MB)
pub const BUILTIN_MEMORY_FREE_MB: f64 = 100.0;

/// Minimum buffer memory (MB)
pub const BUILTIN_MEMORY_BUFFERS_MB: f64 = 50.0;

/// Minimum cache memory (MB)
pub const BUILTIN_MEMORY_CACHE_MB: f64 = 50.0;

// ═══════════════════════════════════════════════════════════════════════════════
// VENDOR STATE ENCODINGS
// ═══════════════════════════════════════════════════════════════════════════════

/// BGP session states that count as "up" across vendor encodings
pub const BGP_UP_STATES: &[&str] = &["Established", "1", "Established/OpenConfirm"];

/// OSPF adjacency state that counts as "up"
pub const OSPF_FULL_STATE: &str = "Full";

/// Component status that counts as healthy
pub const ENV_STATUS_OK: &str = "OK";

/// Fan statuses tolerated on platforms that cannot report fans
pub const ENV_FAN_UNSUPPORTED: &[&str] = &["unsupported", "not supported", "n/a", "na"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minute_conversions() {
        assert_eq!(MINUTES_PER_DAY, 1440);
        assert_eq!(MINUTES_PER_WEEK, 10080);
    }

    #[test]
    fn test_builtin_cpu_tiers_ordered() {
        assert!(BUILTIN_CPU_WARNING < BUILTIN_CPU_CRITICAL);
    }
}
