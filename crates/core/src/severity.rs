//! Severity levels shared by checks and verdicts.

use serde::{Deserialize, Serialize};

/// Severity level.
///
/// Variants are declared in ascending order so the derived `Ord` gives
/// `Pass < Flag < Fail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Nothing to report
    Pass,
    /// Suspicious, should be rewritten
    Flag,
    /// Unsafe
    Fail,
}

impl Severity {
    /// Numeric rank (PASS=0, FLAG=1, FAIL=2).
    pub fn rank(self) -> u8 {
        match self {
            Severity::Pass => 0,
            Severity::Flag => 1,
            Severity::Fail => 2,
        }
    }

    /// Whether this severity requires remediation.
    pub fn is_actionable(self) -> bool {
        self > Severity::Pass
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Pass
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Pass => write!(f, "PASS"),
            Severity::Flag => write!(f, "FLAG"),
            Severity::Fail => write!(f, "FAIL"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PASS" => Ok(Severity::Pass),
            "FLAG" => Ok(Severity::Flag),
            "FAIL" => Ok(Severity::Fail),
            other => Err(format!("unknown severity: {}", other)),
        }
    }
}
