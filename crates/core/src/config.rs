//! Audit configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//! Constructors that consume the config call [`AuditConfig::validate`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use crate::error::ConfigError;
use crate::finding::category;
use crate::session::{AuditMode, RewriteTier};
use crate::severity::Severity;

/// Refusal returned when no safe candidate could be produced.
pub const DEFAULT_REFUSAL: &str = "I'm unable to provide a safe response to that request.";

/// Environment override for `max_retries`.
pub const ENV_MAX_RETRIES: &str = "REDRAFT_MAX_RETRIES";

/// Environment override for `mode`.
pub const ENV_MODE: &str = "REDRAFT_MODE";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Input or output auditing
    pub mode: AuditMode,

    /// Check policies, in registration order
    pub checks: Vec<CheckPolicy>,

    /// Rewrite ceiling
    pub max_retries: u32,

    /// Highest escalation tier (1..=3)
    pub max_tier: u32,

    /// Length bound for strict rewrites
    pub strict_max_words: u32,

    /// Per check call timeout
    pub check_timeout_ms: u64,

    /// Aggregate timeout for one evaluation step
    pub step_timeout_ms: u64,

    /// Per generation call timeout
    pub generation_timeout_ms: u64,

    /// Severity factor table
    pub severity_factors: SeverityFactors,

    /// Minimum effective score per severity
    pub score_floors: ScoreFloors,

    /// Security FAIL forces outcome FAIL and risk >= 90
    pub security_hard_stop: bool,

    /// Text released on FALLBACK
    pub refusal_message: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            mode: AuditMode::Output,
            checks: vec![
                CheckPolicy::new(category::PII),
                CheckPolicy::new(category::SECURITY),
                CheckPolicy::new(category::TOXICITY),
                CheckPolicy::new(category::DATA_QUALITY),
                CheckPolicy::new(category::HARMFUL).disabled(),
                CheckPolicy::new(category::HALLUCINATION).disabled(),
            ],
            max_retries: 3,
            max_tier: RewriteTier::MAX,
            strict_max_words: 150,
            check_timeout_ms: 5_000,
            step_timeout_ms: 10_000,
            generation_timeout_ms: 30_000,
            severity_factors: SeverityFactors::default(),
            score_floors: ScoreFloors::default(),
            security_hard_stop: true,
            refusal_message: DEFAULT_REFUSAL.to_string(),
        }
    }
}

impl AuditConfig {
    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Apply `REDRAFT_*` environment overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(ENV_MAX_RETRIES) {
            self.max_retries = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_MAX_RETRIES,
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(ENV_MODE) {
            self.mode = value.parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_MODE,
                value: value.clone(),
            })?;
        }
        Ok(())
    }

    /// Check every invariant the policy layer relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for policy in &self.checks {
            if policy.category.trim().is_empty() {
                return Err(ConfigError::EmptyCategory);
            }
            if !seen.insert(policy.category.as_str()) {
                return Err(ConfigError::DuplicateCategory(policy.category.clone()));
            }
            policy.validate()?;
        }
        if self.enabled_categories().is_empty() {
            return Err(ConfigError::NoChecksEnabled);
        }

        self.severity_factors.validate()?;
        self.score_floors.validate()?;

        if !(1..=RewriteTier::MAX).contains(&self.max_tier) {
            return Err(ConfigError::InvalidMaxTier(self.max_tier));
        }
        if self.check_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("check_timeout_ms"));
        }
        if self.step_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("step_timeout_ms"));
        }
        if self.generation_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("generation_timeout_ms"));
        }
        Ok(())
    }

    /// Enabled categories in registration order.
    pub fn enabled_categories(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|p| p.enabled)
            .map(|p| p.category.as_str())
            .collect()
    }

    /// Policy for a category.
    pub fn policy(&self, category: &str) -> Option<&CheckPolicy> {
        self.checks.iter().find(|p| p.category == category)
    }

    /// Aggregation weight for a category (1.0 when unconfigured).
    pub fn weight(&self, category: &str) -> f64 {
        self.policy(category).map(|p| p.weight).unwrap_or(1.0)
    }

    /// Severity substituted when a category's check cannot run.
    pub fn fallback_severity(&self, category: &str) -> Severity {
        self.policy(category)
            .map(|p| p.fallback_severity)
            .unwrap_or(Severity::Flag)
    }

    /// Enable a category, adding a default policy if it is not configured.
    pub fn enable(&mut self, category: &str) {
        match self.checks.iter_mut().find(|p| p.category == category) {
            Some(policy) => policy.enabled = true,
            None => self.checks.push(CheckPolicy::new(category)),
        }
    }

    /// Per check call timeout.
    pub fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }

    /// Evaluation step timeout.
    pub fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }

    /// Per generation call timeout.
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }
}

/// Per-category policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckPolicy {
    /// Category identifier
    pub category: String,

    /// Whether the check runs
    pub enabled: bool,

    /// Aggregation weight in (0, 1]
    pub weight: f64,

    /// Severity used when the check cannot run
    pub fallback_severity: Severity,

    /// Scores at or above this are FLAG
    pub flag_at: f64,

    /// Scores at or above this are FAIL
    pub fail_at: f64,
}

impl Default for CheckPolicy {
    fn default() -> Self {
        Self {
            category: String::new(),
            enabled: true,
            weight: 1.0,
            fallback_severity: Severity::Flag,
            flag_at: 0.5,
            fail_at: 0.8,
        }
    }
}

impl CheckPolicy {
    /// Default policy for a category.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Default::default()
        }
    }

    /// Mark as disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Set thresholds.
    pub fn with_thresholds(mut self, flag_at: f64, fail_at: f64) -> Self {
        self.flag_at = flag_at;
        self.fail_at = fail_at;
        self
    }

    /// Map a detector score onto a severity.
    pub fn severity_for(&self, score: f64) -> Severity {
        if score >= self.fail_at {
            Severity::Fail
        } else if score >= self.flag_at {
            Severity::Flag
        } else {
            Severity::Pass
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.weight > 0.0 && self.weight <= 1.0) {
            return Err(ConfigError::InvalidWeight {
                category: self.category.clone(),
                weight: self.weight,
            });
        }
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if !in_range(self.flag_at) || !in_range(self.fail_at) || self.flag_at > self.fail_at {
            return Err(ConfigError::InvalidThresholds {
                category: self.category.clone(),
                flag_at: self.flag_at,
                fail_at: self.fail_at,
            });
        }
        Ok(())
    }
}

/// Multiplier applied per severity when scoring risk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityFactors {
    /// Factor for PASS; must be zero
    pub pass: f64,
    /// Factor for FLAG
    pub flag: f64,
    /// Factor for FAIL
    pub fail: f64,
}

impl Default for SeverityFactors {
    fn default() -> Self {
        Self {
            pass: 0.0,
            flag: 0.5,
            fail: 0.9,
        }
    }
}

impl SeverityFactors {
    /// Factor for a severity.
    pub fn factor(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Pass => self.pass,
            Severity::Flag => self.flag,
            Severity::Fail => self.fail,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pass != 0.0 {
            return Err(ConfigError::InvalidSeverityFactors(
                "pass factor must be 0".to_string(),
            ));
        }
        if !(self.flag > 0.0 && self.flag <= self.fail && self.fail <= 1.0) {
            return Err(ConfigError::InvalidSeverityFactors(format!(
                "expected 0 < flag <= fail <= 1, got flag={} fail={}",
                self.flag, self.fail
            )));
        }
        Ok(())
    }
}

/// Minimum effective detector score per severity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreFloors {
    /// Floor for PASS
    pub pass: f64,
    /// Floor for FLAG
    pub flag: f64,
    /// Floor for FAIL
    pub fail: f64,
}

impl Default for ScoreFloors {
    fn default() -> Self {
        Self {
            pass: 0.0,
            flag: 0.5,
            fail: 0.8,
        }
    }
}

impl ScoreFloors {
    /// Floor for a severity.
    pub fn floor(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Pass => self.pass,
            Severity::Flag => self.flag,
            Severity::Fail => self.fail,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("pass", self.pass), ("flag", self.flag), ("fail", self.fail)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidScoreFloors(format!(
                    "{} floor {} outside [0, 1]",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AuditConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.enabled_categories(),
            vec!["pii", "security", "toxicity", "data_quality"]
        );
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: AuditConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AuditConfig::default());
    }

    #[test]
    fn test_partial_policy_fills_defaults() {
        let config: AuditConfig = serde_json::from_str(
            r#"{"checks": [{"category": "pii", "weight": 0.7}], "max_retries": 1}"#,
        )
        .unwrap();
        assert_eq!(config.checks.len(), 1);
        assert_eq!(config.weight("pii"), 0.7);
        assert_eq!(config.fallback_severity("pii"), Severity::Flag);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_no_checks_enabled_is_rejected() {
        let mut config = AuditConfig::default();
        for policy in &mut config.checks {
            policy.enabled = false;
        }
        assert!(matches!(config.validate(), Err(ConfigError::NoChecksEnabled)));
    }

    #[test]
    fn test_invalid_weight_is_rejected() {
        let mut config = AuditConfig::default();
        config.checks[0].weight = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWeight { .. })));
    }

    #[test]
    fn test_inverted_thresholds_are_rejected() {
        let mut config = AuditConfig::default();
        config.checks[2] = CheckPolicy::new("toxicity").with_thresholds(0.8, 0.4);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidThresholds { .. })));
    }

    #[test]
    fn test_duplicate_category_is_rejected() {
        let mut config = AuditConfig::default();
        config.checks.push(CheckPolicy::new("pii"));
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateCategory(_))));
    }

    #[test]
    fn test_nonzero_pass_factor_is_rejected() {
        let mut config = AuditConfig::default();
        config.severity_factors.pass = 0.1;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSeverityFactors(_))));
    }

    #[test]
    fn test_max_tier_bounds() {
        let mut config = AuditConfig::default();
        config.max_tier = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMaxTier(0))));
        config.max_tier = 4;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMaxTier(4))));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut config = AuditConfig::default();
        config.generation_timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout(_))));
    }

    #[test]
    fn test_threshold_mapping_is_inclusive() {
        let policy = CheckPolicy::new("toxicity").with_thresholds(0.4, 0.7);
        assert_eq!(policy.severity_for(0.39), Severity::Pass);
        assert_eq!(policy.severity_for(0.4), Severity::Flag);
        assert_eq!(policy.severity_for(0.7), Severity::Fail);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AuditConfig::default();
        config
            .apply_overrides(|var| match var {
                ENV_MAX_RETRIES => Some("5".to_string()),
                ENV_MODE => Some("input".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.mode, AuditMode::Input);

        let err = config
            .apply_overrides(|var| (var == ENV_MAX_RETRIES).then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: ENV_MAX_RETRIES, .. }));
    }

    #[test]
    fn test_enable_adds_missing_policy() {
        let mut config = AuditConfig::default();
        config.enable(category::HALLUCINATION);
        config.enable("custom");
        let enabled = config.enabled_categories();
        assert!(enabled.contains(&"hallucination"));
        assert_eq!(enabled.last(), Some(&"custom"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("redraft.json");
        std::fs::write(&path, r#"{"max_retries": 2, "mode": "input"}"#).unwrap();

        let config = AuditConfig::load(&path).unwrap();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.mode, AuditMode::Input);

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(AuditConfig::load(&path), Err(ConfigError::Parse(_))));
    }
}
