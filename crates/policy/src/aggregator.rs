//! Severity aggregator.
//!
//! Folds one evaluation step's findings into a [`Verdict`]. The outcome is
//! the worst severity; the risk score is driven by the single worst weighted
//! contribution rather than a sum, so many weak signals do not stack.

use std::collections::{BTreeMap, HashMap};
use redraft_core::{
    category, AuditConfig, ConfigError, Finding, ScoreFloors, Severity, SeverityFactors, Verdict,
};

/// Minimum risk score when the security hard stop applies.
pub const SECURITY_HARD_STOP_RISK: u8 = 90;

/// Pure aggregation policy.
#[derive(Debug, Clone)]
pub struct SeverityAggregator {
    weights: HashMap<String, f64>,
    factors: SeverityFactors,
    floors: ScoreFloors,
    security_hard_stop: bool,
}

impl SeverityAggregator {
    /// Build from a validated config.
    pub fn from_config(config: &AuditConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            weights: config
                .checks
                .iter()
                .map(|p| (p.category.clone(), p.weight))
                .collect(),
            factors: config.severity_factors,
            floors: config.score_floors,
            security_hard_stop: config.security_hard_stop,
        })
    }

    fn weight(&self, category: &str) -> f64 {
        self.weights.get(category).copied().unwrap_or(1.0)
    }

    fn contribution(&self, finding: &Finding) -> f64 {
        let score = finding.score.max(self.floors.floor(finding.severity));
        self.weight(&finding.category) * self.factors.factor(finding.severity) * score
    }

    /// Aggregate findings into a verdict.
    ///
    /// Deterministic: the same findings always give the same verdict.
    pub fn aggregate(&self, findings: &[Finding]) -> Verdict {
        let outcome = findings
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or(Severity::Pass);

        let worst = findings
            .iter()
            .map(|f| self.contribution(f))
            .filter(|c| c.is_finite())
            .fold(0.0_f64, f64::max);
        let mut risk_score = (worst * 100.0).round().clamp(0.0, 100.0) as u8;

        if outcome == Severity::Pass {
            risk_score = 0;
        } else if risk_score == 0 {
            risk_score = 1;
        }

        let security_fail = findings
            .iter()
            .any(|f| f.category == category::SECURITY && f.severity == Severity::Fail);
        if self.security_hard_stop && security_fail {
            risk_score = risk_score.max(SECURITY_HARD_STOP_RISK);
        }

        let reasons = findings
            .iter()
            .filter(|f| f.severity.is_actionable())
            .map(|f| {
                if f.summary.trim().is_empty() {
                    f.category.clone()
                } else {
                    f.summary.clone()
                }
            })
            .collect();

        let mut findings_by_category = BTreeMap::new();
        for finding in findings {
            findings_by_category
                .entry(finding.category.clone())
                .or_insert_with(|| finding.clone());
        }

        Verdict {
            outcome,
            risk_score,
            reasons,
            findings_by_category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redraft_core::CheckPolicy;

    fn aggregator() -> SeverityAggregator {
        SeverityAggregator::from_config(&AuditConfig::default()).unwrap()
    }

    fn finding(cat: &str, severity: Severity, score: f64) -> Finding {
        Finding::new(cat, severity, score, format!("{} issue", cat))
    }

    /// Every severity combination over three categories with a spread of scores.
    fn finding_sets() -> Vec<Vec<Finding>> {
        let severities = [Severity::Pass, Severity::Flag, Severity::Fail];
        let scores = [0.0, 0.3, 1.0];
        let mut sets = Vec::new();
        for a in severities {
            for b in severities {
                for c in severities {
                    for score in scores {
                        sets.push(vec![
                            finding("pii", a, score),
                            finding("toxicity", b, 1.0 - score),
                            finding("data_quality", c, score),
                        ]);
                    }
                }
            }
        }
        sets
    }

    #[test]
    fn test_outcome_is_fail_iff_some_finding_fails() {
        let aggregator = aggregator();
        for set in finding_sets() {
            let verdict = aggregator.aggregate(&set);
            let any_fail = set.iter().any(|f| f.severity == Severity::Fail);
            assert_eq!(verdict.outcome == Severity::Fail, any_fail);
        }
    }

    #[test]
    fn test_zero_risk_iff_pass() {
        let aggregator = aggregator();
        for set in finding_sets() {
            let verdict = aggregator.aggregate(&set);
            assert_eq!(verdict.risk_score == 0, verdict.outcome == Severity::Pass);
        }
    }

    #[test]
    fn test_zero_risk_iff_pass_with_zero_floors() {
        let mut config = AuditConfig::default();
        config.score_floors = ScoreFloors {
            pass: 0.0,
            flag: 0.0,
            fail: 0.0,
        };
        config.checks = vec![CheckPolicy {
            weight: 0.001,
            ..CheckPolicy::new("pii")
        }];
        let aggregator = SeverityAggregator::from_config(&config).unwrap();

        let verdict = aggregator.aggregate(&[finding("pii", Severity::Flag, 0.0)]);
        assert_eq!(verdict.outcome, Severity::Flag);
        assert_eq!(verdict.risk_score, 1);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let aggregator = aggregator();
        for set in finding_sets() {
            assert_eq!(aggregator.aggregate(&set), aggregator.aggregate(&set));
        }
    }

    #[test]
    fn test_flag_never_reaches_fail_risk() {
        let aggregator = aggregator();
        let flag = aggregator.aggregate(&[finding("pii", Severity::Flag, 1.0)]);
        let fail = aggregator.aggregate(&[finding("pii", Severity::Fail, 0.0)]);
        assert_eq!(flag.risk_score, 50);
        assert_eq!(fail.risk_score, 72);
        assert!(flag.risk_score < fail.risk_score);
    }

    #[test]
    fn test_max_not_sum() {
        let aggregator = aggregator();
        let one = aggregator.aggregate(&[finding("pii", Severity::Flag, 0.6)]);
        let many = aggregator.aggregate(&[
            finding("pii", Severity::Flag, 0.6),
            finding("toxicity", Severity::Flag, 0.6),
            finding("data_quality", Severity::Flag, 0.6),
        ]);
        assert_eq!(one.risk_score, 30);
        assert_eq!(many.risk_score, 30);
    }

    #[test]
    fn test_security_hard_stop() {
        let mut config = AuditConfig::default();
        config.checks[1].weight = 0.1;
        assert_eq!(config.checks[1].category, "security");
        let aggregator = SeverityAggregator::from_config(&config).unwrap();

        let verdict = aggregator.aggregate(&[
            Finding::pass("pii"),
            finding("security", Severity::Fail, 0.2),
            Finding::pass("toxicity"),
        ]);
        assert_eq!(verdict.outcome, Severity::Fail);
        assert!(verdict.risk_score >= SECURITY_HARD_STOP_RISK);
    }

    #[test]
    fn test_security_hard_stop_can_be_disabled() {
        let mut config = AuditConfig::default();
        config.checks[1].weight = 0.1;
        config.security_hard_stop = false;
        let aggregator = SeverityAggregator::from_config(&config).unwrap();

        let verdict = aggregator.aggregate(&[finding("security", Severity::Fail, 0.2)]);
        assert_eq!(verdict.outcome, Severity::Fail);
        assert_eq!(verdict.risk_score, 7);
    }

    #[test]
    fn test_reasons_follow_finding_order() {
        let verdict = aggregator().aggregate(&[
            finding("toxicity", Severity::Flag, 0.5),
            Finding::pass("security"),
            finding("pii", Severity::Fail, 1.0),
            Finding::new("data_quality", Severity::Flag, 0.25, ""),
        ]);
        assert_eq!(
            verdict.reasons,
            vec!["toxicity issue", "pii issue", "data_quality"]
        );
    }

    #[test]
    fn test_duplicate_category_keeps_first_but_all_count() {
        let verdict = aggregator().aggregate(&[
            finding("pii", Severity::Pass, 0.0),
            finding("pii", Severity::Fail, 1.0),
        ]);
        assert_eq!(verdict.outcome, Severity::Fail);
        assert_eq!(verdict.findings_by_category.len(), 1);
        assert_eq!(verdict.findings_by_category["pii"].severity, Severity::Pass);
        assert_eq!(verdict.reasons, vec!["pii issue"]);
    }

    #[test]
    fn test_empty_findings_pass() {
        let verdict = aggregator().aggregate(&[]);
        assert!(verdict.is_pass());
        assert_eq!(verdict.risk_score, 0);
        assert!(verdict.reasons.is_empty());
    }

    #[test]
    fn test_unknown_category_uses_unit_weight() {
        let verdict = aggregator().aggregate(&[finding("custom", Severity::Fail, 1.0)]);
        assert_eq!(verdict.risk_score, 90);
    }

    #[test]
    fn test_verdict_serializes_uppercase_outcome() {
        let verdict = aggregator().aggregate(&[finding("pii", Severity::Flag, 1.0)]);
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["outcome"], "FLAG");
    }
}
