//! Session model - remediation attempts, trails and session results.

use serde::{Deserialize, Serialize};
use crate::id::SessionId;
use crate::severity::Severity;
use crate::verdict::Verdict;
use crate::Time;

/// Strictness tier of rewrite instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteTier {
    /// Remove identified issues, preserve meaning and length
    Soft,
    /// No unverifiable claims, no identifying details, bounded length
    Strict,
    /// Refuse if risky, otherwise a short generic answer
    UltraStrict,
}

impl RewriteTier {
    /// Highest tier.
    pub const MAX: u32 = 3;

    /// Tier for an attempt level: `min(level, max_tier)`.
    ///
    /// Level 0 is treated as level 1 and `max_tier` is clamped to 1..=3.
    pub fn for_level(level: u32, max_tier: u32) -> Self {
        let tier = level.max(1).min(max_tier.clamp(1, Self::MAX));
        match tier {
            1 => RewriteTier::Soft,
            2 => RewriteTier::Strict,
            _ => RewriteTier::UltraStrict,
        }
    }

    /// Numeric tier (1-based).
    pub fn number(self) -> u32 {
        match self {
            RewriteTier::Soft => 1,
            RewriteTier::Strict => 2,
            RewriteTier::UltraStrict => 3,
        }
    }
}

impl std::fmt::Display for RewriteTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RewriteTier::Soft => write!(f, "soft"),
            RewriteTier::Strict => write!(f, "strict"),
            RewriteTier::UltraStrict => write!(f, "ultra_strict"),
        }
    }
}

/// Whether a session audits user input or model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditMode {
    /// User input: audit only, never rewrite
    Input,
    /// Model output: audit and remediate
    #[default]
    Output,
}

impl std::fmt::Display for AuditMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditMode::Input => write!(f, "input"),
            AuditMode::Output => write!(f, "output"),
        }
    }
}

impl std::str::FromStr for AuditMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "input" => Ok(AuditMode::Input),
            "output" => Ok(AuditMode::Output),
            other => Err(format!("unknown audit mode: {}", other)),
        }
    }
}

/// Terminal outcome of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FinalOutcome {
    /// Released as-is
    Pass,
    /// Flagged (input mode only)
    Flag,
    /// Rejected without remediation (empty input, input mode)
    Fail,
    /// Retries exhausted or generation failed; refusal returned
    Fallback,
}

impl From<Severity> for FinalOutcome {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Pass => FinalOutcome::Pass,
            Severity::Flag => FinalOutcome::Flag,
            Severity::Fail => FinalOutcome::Fail,
        }
    }
}

impl std::fmt::Display for FinalOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinalOutcome::Pass => write!(f, "PASS"),
            FinalOutcome::Flag => write!(f, "FLAG"),
            FinalOutcome::Fail => write!(f, "FAIL"),
            FinalOutcome::Fallback => write!(f, "FALLBACK"),
        }
    }
}

/// One iteration of the remediation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationAttempt {
    /// Attempt level; 0 is the initial draft
    pub level: u32,

    /// Tier used to produce the candidate (None for the initial draft)
    pub tier: Option<RewriteTier>,

    /// Candidate text
    pub candidate_text: String,

    /// Verdict for the candidate
    pub verdict: Verdict,
}

/// What a session starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionInput {
    /// Generate the initial draft from a prompt
    Prompt {
        /// User prompt
        prompt: String,
    },
    /// Audit a caller-supplied draft
    Candidate {
        /// Prompt the draft answers, if known
        prompt: Option<String>,
        /// Draft text
        text: String,
    },
}

impl SessionInput {
    /// Start from a prompt.
    pub fn prompt(prompt: impl Into<String>) -> Self {
        SessionInput::Prompt { prompt: prompt.into() }
    }

    /// Start from an existing draft.
    pub fn candidate(text: impl Into<String>) -> Self {
        SessionInput::Candidate { prompt: None, text: text.into() }
    }

    /// The user prompt, if any.
    pub fn user_prompt(&self) -> Option<&str> {
        match self {
            SessionInput::Prompt { prompt } => Some(prompt),
            SessionInput::Candidate { prompt, .. } => prompt.as_deref(),
        }
    }
}

/// Result of one audit session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Session identifier
    pub id: SessionId,

    /// Audit mode
    pub mode: AuditMode,

    /// Original prompt, if known
    pub original_prompt: Option<String>,

    /// Text released to the caller
    pub final_text: String,

    /// Terminal outcome
    pub final_outcome: FinalOutcome,

    /// Verdict of the last completed attempt
    pub final_verdict: Verdict,

    /// Completed attempts, starting with the initial draft
    pub trail: Vec<RemediationAttempt>,

    /// Rewrites requested
    pub attempts_used: u32,

    /// Session was cancelled before reaching a terminal state
    pub cancelled: bool,

    /// When the session started
    pub started_at: Time,

    /// When the session finished
    pub finished_at: Time,
}

impl SessionResult {
    /// Flatten into the record handed to sinks.
    pub fn to_record(&self) -> SessionRecord {
        let original = self
            .original_prompt
            .clone()
            .or_else(|| self.trail.first().map(|a| a.candidate_text.clone()))
            .unwrap_or_default();

        SessionRecord {
            id: self.id,
            original,
            final_text: self.final_text.clone(),
            outcome: self.final_outcome,
            risk_score: self.final_verdict.risk_score,
            reasons: self.final_verdict.reasons.clone(),
            attempts: self.attempts_used,
            mode: self.mode,
            cancelled: self.cancelled,
            finished_at: self.finished_at,
        }
    }
}

/// Flat, serializable session summary for persistence and notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session identifier
    pub id: SessionId,
    /// Original prompt, or the initial draft when no prompt is known
    pub original: String,
    /// Released text
    pub final_text: String,
    /// Terminal outcome
    pub outcome: FinalOutcome,
    /// Risk score of the final verdict
    pub risk_score: u8,
    /// Reasons of the final verdict
    pub reasons: Vec<String>,
    /// Rewrites requested
    pub attempts: u32,
    /// Audit mode
    pub mode: AuditMode,
    /// Session was cancelled
    pub cancelled: bool,
    /// When the session finished
    pub finished_at: Time,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_selection_is_capped() {
        assert_eq!(RewriteTier::for_level(1, 3), RewriteTier::Soft);
        assert_eq!(RewriteTier::for_level(2, 3), RewriteTier::Strict);
        assert_eq!(RewriteTier::for_level(3, 3), RewriteTier::UltraStrict);
        assert_eq!(RewriteTier::for_level(7, 3), RewriteTier::UltraStrict);
        assert_eq!(RewriteTier::for_level(5, 2), RewriteTier::Strict);
        assert_eq!(RewriteTier::for_level(0, 3), RewriteTier::Soft);
        assert_eq!(RewriteTier::for_level(2, 0), RewriteTier::Soft);
    }

    #[test]
    fn test_final_outcome_from_severity() {
        assert_eq!(FinalOutcome::from(Severity::Pass), FinalOutcome::Pass);
        assert_eq!(FinalOutcome::from(Severity::Flag), FinalOutcome::Flag);
        assert_eq!(FinalOutcome::from(Severity::Fail), FinalOutcome::Fail);
        assert_eq!(serde_json::to_string(&FinalOutcome::Fallback).unwrap(), "\"FALLBACK\"");
    }

    #[test]
    fn test_record_falls_back_to_initial_draft() {
        let now = chrono::Utc::now();
        let result = SessionResult {
            id: SessionId::new(),
            mode: AuditMode::Output,
            original_prompt: None,
            final_text: "ok".to_string(),
            final_outcome: FinalOutcome::Pass,
            final_verdict: Verdict {
                outcome: Severity::Pass,
                risk_score: 0,
                reasons: Vec::new(),
                findings_by_category: Default::default(),
            },
            trail: vec![RemediationAttempt {
                level: 0,
                tier: None,
                candidate_text: "draft".to_string(),
                verdict: Verdict::empty_input(),
            }],
            attempts_used: 0,
            cancelled: false,
            started_at: now,
            finished_at: now,
        };

        let record = result.to_record();
        assert_eq!(record.original, "draft");
        assert_eq!(record.outcome, FinalOutcome::Pass);
        assert_eq!(record.attempts, 0);
    }

    #[test]
    fn test_audit_mode_parse() {
        assert_eq!("INPUT".parse::<AuditMode>().unwrap(), AuditMode::Input);
        assert!("sideways".parse::<AuditMode>().is_err());
    }
}
