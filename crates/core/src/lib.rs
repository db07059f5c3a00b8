//! Redraft core data models.
//!
//! This crate defines the data structures shared by the signal collector,
//! the severity policy and the audit-remediate orchestrator.

#![warn(missing_docs)]

// Core identities
mod id;

// Findings and verdicts
mod severity;
mod finding;
mod verdict;

// Sessions
mod session;

// Configuration
mod config;
mod error;

// Re-exports
pub use id::*;

pub use severity::Severity;
pub use finding::{category, Finding};
pub use verdict::{Verdict, RiskTier, EMPTY_INPUT_REASON, CANCELLED_REASON, GENERATION_FAILED_REASON};
pub use session::{
    RewriteTier, AuditMode, FinalOutcome, RemediationAttempt,
    SessionInput, SessionResult, SessionRecord,
};
pub use config::{
    AuditConfig, CheckPolicy, SeverityFactors, ScoreFloors,
    DEFAULT_REFUSAL, ENV_MAX_RETRIES, ENV_MODE,
};
pub use error::ConfigError;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
