//! Check abstraction.

use async_trait::async_trait;
use redraft_core::Finding;

/// Why a check could not produce a finding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    /// Backing model or service is unavailable
    #[error("check unavailable: {0}")]
    Unavailable(String),

    /// Check ran but failed
    #[error("check failed: {0}")]
    Failed(String),
}

/// A safety check over one candidate text.
///
/// Checks are read-only over the text and independent of each other.
#[async_trait]
pub trait Check: Send + Sync {
    /// Category this check reports under.
    fn category(&self) -> &str;

    /// Evaluate a text.
    async fn evaluate(&self, text: &str, context: &str) -> Result<Finding, CheckError>;
}
