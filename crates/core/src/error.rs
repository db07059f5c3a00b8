//! Configuration errors.

/// Errors raised while loading or validating configuration.
///
/// All of these are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No check category is enabled
    #[error("no checks enabled")]
    NoChecksEnabled,

    /// A check policy has an empty category name
    #[error("check policy with empty category")]
    EmptyCategory,

    /// The same category is configured twice
    #[error("duplicate check category: {0}")]
    DuplicateCategory(String),

    /// An enabled category has no registered check
    #[error("no check registered for enabled category: {0}")]
    MissingCheck(String),

    /// Weight outside (0, 1]
    #[error("invalid weight {weight} for category {category}: must be in (0, 1]")]
    InvalidWeight {
        /// Category
        category: String,
        /// Configured weight
        weight: f64,
    },

    /// Detector thresholds out of range or inverted
    #[error("invalid thresholds for category {category}: flag_at={flag_at}, fail_at={fail_at}")]
    InvalidThresholds {
        /// Category
        category: String,
        /// FLAG cut point
        flag_at: f64,
        /// FAIL cut point
        fail_at: f64,
    },

    /// Severity factor table breaks the risk-score invariants
    #[error("invalid severity factors: {0}")]
    InvalidSeverityFactors(String),

    /// Score floors out of range
    #[error("invalid score floors: {0}")]
    InvalidScoreFloors(String),

    /// Escalation ceiling outside 1..=3
    #[error("invalid max tier {0}: must be between 1 and 3")]
    InvalidMaxTier(u32),

    /// A timeout of zero
    #[error("timeout must be non-zero: {0}")]
    ZeroTimeout(&'static str),

    /// Environment override could not be parsed
    #[error("invalid value for {var}: {value}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },

    /// I/O error while reading a config file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed config file
    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),
}
