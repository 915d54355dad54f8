//! Error types for the health-check view.
//!
//! Only malformed calls and unresolvable thresholds surface as errors.
//! Everything else a device can report, including missing or oddly shaped
//! fact sections, resolves to an explicit check verdict instead.

use thiserror::Error;

/// Result type alias for health-check operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the health-check view
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Call Errors
    // ═══════════════════════════════════════════════════════════════════

    /// The call itself is malformed (missing facts or target, bad target shape)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A check needs a threshold that no source could supply
    #[error("Missing threshold '{key}' for check '{check}': not set on the check, in the facts, or in the configured defaults")]
    MissingThreshold {
        /// Check that requested the threshold
        check: String,
        /// Threshold key looked up in the defaults store
        key: String,
    },

    /// A fact section is not of the expected JSON type
    #[error("Malformed facts: '{section}' must be {expected}")]
    MalformedFacts {
        /// Offending section (or "facts" for the root)
        section: String,
        /// Expected JSON shape
        expected: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Default-threshold configuration is invalid or already initialized
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading a configuration or input file failed
    #[error("IO error: {0}")]
    Io(String),

    // ═══════════════════════════════════════════════════════════════════
    // Serialization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Shorthand for a missing threshold
    pub fn missing_threshold(check: impl Into<String>, key: impl Into<String>) -> Self {
        Error::MissingThreshold {
            check: check.into(),
            key: key.into(),
        }
    }

    /// Returns true if the caller supplied something unusable
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::MalformedFacts { .. } | Error::Deserialization(_)
        )
    }

    /// Returns true if the error comes from threshold configuration
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::MissingThreshold { .. } | Error::Config(_))
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Call errors: 1xxx
            Error::InvalidInput(_) => 1001,
            Error::MissingThreshold { .. } => 1002,
            Error::MalformedFacts { .. } => 1003,

            // Configuration errors: 2xxx
            Error::Config(_) => 2001,
            Error::Io(_) => 2002,

            // Serialization errors: 7xxx
            Error::Serialization(_) => 7001,
            Error::Deserialization(_) => 7002,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Deserialization(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_unique() {
        let codes = vec![
            Error::InvalidInput("".into()).code(),
            Error::missing_threshold("", "").code(),
            Error::MalformedFacts { section: "".into(), expected: "".into() }.code(),
            Error::Config("".into()).code(),
            Error::Io("".into()).code(),
            Error::Serialization("".into()).code(),
            Error::Deserialization("".into()).code(),
        ];

        let mut unique_codes = codes.clone();
        unique_codes.sort();
        unique_codes.dedup();

        assert_eq!(codes.len(), unique_codes.len(), "Error codes must be unique");
    }

    #[test]
    fn test_missing_threshold_display() {
        let err = Error::missing_threshold("filesystem_status_summary", "filesystem_free_threshold");
        assert!(err.to_string().contains("filesystem_status_summary"));
        assert!(err.to_string().contains("filesystem_free_threshold"));
    }

    #[test]
    fn test_error_classes() {
        assert!(Error::InvalidInput("no target".into()).is_caller_error());
        assert!(!Error::InvalidInput("no target".into()).is_configuration());
        assert!(Error::missing_threshold("a", "b").is_configuration());
        assert!(!Error::Io("x".into()).is_caller_error());
    }

    #[test]
    fn test_from_serde_error() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::Deserialization(_)));
    }
}
