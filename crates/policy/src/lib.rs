//! Redraft severity policy.
//!
//! Aggregation of findings into verdicts, and escalation of failed verdicts
//! into tiered rewrite instructions.

#![warn(missing_docs)]

mod aggregator;
mod escalator;

pub use aggregator::{SeverityAggregator, SECURITY_HARD_STOP_RISK};
pub use escalator::{RemediationEscalator, TIER3_REFUSAL};
