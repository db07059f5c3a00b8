//! Finding model - the normalized output of one safety check.

use serde::{Deserialize, Serialize};
use crate::severity::Severity;

/// Well-known check categories.
pub mod category {
    /// Personally identifiable information.
    pub const PII: &str = "pii";
    /// Malicious-instruction content. FAIL here is a hard stop.
    pub const SECURITY: &str = "security";
    /// Toxic or biased language.
    pub const TOXICITY: &str = "toxicity";
    /// Low-quality output (placeholders, repetition, overconfidence).
    pub const DATA_QUALITY: &str = "data_quality";
    /// Generic harm classifier.
    pub const HARMFUL: &str = "harmful";
    /// Unsupported factual claims.
    pub const HALLUCINATION: &str = "hallucination";
}

/// Output of one check invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Check category
    pub category: String,

    /// Severity assigned by the check
    pub severity: Severity,

    /// Detector confidence in [0, 1]
    pub score: f64,

    /// Check-specific payload, never interpreted by the aggregator
    #[serde(default)]
    pub detail: serde_json::Value,

    /// Short summary without raw sensitive content
    pub summary: String,

    /// Substituted by the collector because the check could not run
    #[serde(default)]
    pub fallback: bool,
}

impl Finding {
    /// Create a finding. The score is clamped into [0, 1].
    pub fn new(
        category: impl Into<String>,
        severity: Severity,
        score: f64,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            severity,
            score: clamp_score(score),
            detail: serde_json::Value::Null,
            summary: summary.into(),
            fallback: false,
        }
    }

    /// A clean PASS finding for a category.
    pub fn pass(category: impl Into<String>) -> Self {
        Self::new(category, Severity::Pass, 0.0, "")
    }

    /// The finding substituted for a check that could not run.
    pub fn fallback(category: impl Into<String>, severity: Severity) -> Self {
        let category = category.into();
        let score = match severity {
            Severity::Pass => 0.0,
            Severity::Flag => 0.5,
            Severity::Fail => 1.0,
        };
        let summary = format!("{} check unavailable", category);
        Self {
            category,
            severity,
            score,
            detail: serde_json::Value::Null,
            summary,
            fallback: true,
        }
    }

    /// Attach a detail payload.
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_clamped() {
        assert_eq!(Finding::new("pii", Severity::Fail, 1.7, "x").score, 1.0);
        assert_eq!(Finding::new("pii", Severity::Fail, -0.2, "x").score, 0.0);
        assert_eq!(Finding::new("pii", Severity::Fail, f64::NAN, "x").score, 0.0);
    }

    #[test]
    fn test_fallback_finding() {
        let finding = Finding::fallback(category::TOXICITY, Severity::Flag);
        assert!(finding.fallback);
        assert_eq!(finding.severity, Severity::Flag);
        assert_eq!(finding.score, 0.5);
        assert_eq!(finding.summary, "toxicity check unavailable");
    }

    #[test]
    fn test_detail_defaults_when_missing() {
        let finding: Finding = serde_json::from_str(
            r#"{"category":"pii","severity":"FLAG","score":0.4,"summary":"email(1)"}"#,
        )
        .unwrap();
        assert!(finding.detail.is_null());
        assert!(!finding.fallback);
    }
}
