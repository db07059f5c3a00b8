//! Verdict model - the aggregated decision for one candidate text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::finding::Finding;
use crate::severity::Severity;

/// Reason reported when the candidate text is empty or whitespace.
pub const EMPTY_INPUT_REASON: &str = "empty input";

/// Reason reported when a session is cancelled before any attempt completed.
pub const CANCELLED_REASON: &str = "cancelled";

/// Reason reported when the initial draft could not be generated.
pub const GENERATION_FAILED_REASON: &str = "generation failed";

/// Aggregated decision over all findings for one candidate text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Maximum severity across findings
    pub outcome: Severity,

    /// Risk score, 0-100. Zero iff the outcome is PASS.
    pub risk_score: u8,

    /// Summaries of triggering findings, in check registration order
    pub reasons: Vec<String>,

    /// Findings keyed by category
    pub findings_by_category: BTreeMap<String, Finding>,
}

impl Verdict {
    /// Verdict for an empty candidate. No checks are run.
    pub fn empty_input() -> Self {
        Self::rejected(EMPTY_INPUT_REASON)
    }

    /// Verdict for a session cancelled before its first evaluation finished.
    pub fn cancelled() -> Self {
        Self::rejected(CANCELLED_REASON)
    }

    /// Verdict for a session whose initial draft could not be generated.
    pub fn generation_failed() -> Self {
        Self::rejected(GENERATION_FAILED_REASON)
    }

    fn rejected(reason: &str) -> Self {
        Self {
            outcome: Severity::Fail,
            risk_score: 100,
            reasons: vec![reason.to_string()],
            findings_by_category: BTreeMap::new(),
        }
    }

    /// Whether the candidate may be released as-is.
    pub fn is_pass(&self) -> bool {
        self.outcome == Severity::Pass
    }

    /// Coarse risk band derived from the score.
    pub fn risk_tier(&self) -> RiskTier {
        RiskTier::from_score(self.risk_score)
    }
}

/// Coarse risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    /// Score below 50
    Low,
    /// Score in [50, 90)
    Medium,
    /// Score of 90 or more
    High,
}

impl RiskTier {
    /// Band for a risk score.
    pub fn from_score(score: u8) -> Self {
        if score >= 90 {
            RiskTier::High
        } else if score >= 50 {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::Low => write!(f, "low"),
            RiskTier::Medium => write!(f, "medium"),
            RiskTier::High => write!(f, "high"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_verdict() {
        let verdict = Verdict::empty_input();
        assert_eq!(verdict.outcome, Severity::Fail);
        assert_eq!(verdict.reasons, vec!["empty input".to_string()]);
        assert!(verdict.findings_by_category.is_empty());
        assert!(verdict.risk_score > 0);
    }

    #[test]
    fn test_risk_tier_bands() {
        assert_eq!(RiskTier::from_score(0), RiskTier::Low);
        assert_eq!(RiskTier::from_score(49), RiskTier::Low);
        assert_eq!(RiskTier::from_score(50), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(89), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(90), RiskTier::High);
    }
}
