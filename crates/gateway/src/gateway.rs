//! Generation gateway abstraction.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Errors a generation backend can report.
///
/// An empty response is an error, never a valid candidate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Call did not finish in time
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    /// Backend answered with nothing usable
    #[error("empty response from generation backend")]
    EmptyResponse,

    /// Network or decoding failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Backend returned a non-success status
    #[error("backend returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },
}

/// Text generation backend used for drafts, rewrites and LLM-judge checks.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Produce an initial draft for a user prompt.
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError>;

    /// Rewrite `prior_text` following `instructions`.
    async fn rewrite(&self, instructions: &str, prior_text: &str) -> Result<String, GatewayError>;

    /// Answer a classification prompt (short label expected).
    async fn classify(&self, prompt: &str) -> Result<String, GatewayError>;
}

/// Reject empty or whitespace-only responses.
pub fn non_empty(text: String) -> Result<String, GatewayError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(GatewayError::EmptyResponse)
    } else if trimmed.len() == text.len() {
        Ok(text)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Prompt sent to a completion backend for a rewrite.
pub fn rewrite_prompt(instructions: &str, prior_text: &str) -> String {
    format!("{}\n\nOriginal:\n{}", instructions, prior_text)
}

/// Bound a gateway call; elapsed calls become [`GatewayError::Timeout`].
pub async fn with_timeout<F>(limit: Duration, call: F) -> Result<String, GatewayError>
where
    F: Future<Output = Result<String, GatewayError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(GatewayError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_rejects_whitespace() {
        assert_eq!(non_empty("   \n".to_string()), Err(GatewayError::EmptyResponse));
        assert_eq!(non_empty(String::new()), Err(GatewayError::EmptyResponse));
        assert_eq!(non_empty("  ok \n".to_string()), Ok("ok".to_string()));
    }

    #[test]
    fn test_rewrite_prompt_layout() {
        let prompt = rewrite_prompt("Be neutral.", "draft");
        assert_eq!(prompt, "Be neutral.\n\nOriginal:\ndraft");
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_elapses() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok("late".to_string())
        };
        let result = with_timeout(Duration::from_secs(1), slow).await;
        assert_eq!(result, Err(GatewayError::Timeout(Duration::from_secs(1))));
    }

    #[tokio::test]
    async fn test_with_timeout_passes_through() {
        let result = with_timeout(Duration::from_secs(1), async { Err(GatewayError::EmptyResponse) }).await;
        assert_eq!(result, Err(GatewayError::EmptyResponse));
    }
}
