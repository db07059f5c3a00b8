//! High-risk webhook notifications.
//!
//! Posts a chat-style JSON payload (`{"text": ..., "record": ...}`) for
//! sessions that ended in FALLBACK or whose final risk falls in the notify
//! tier or above. Other sessions are skipped.

use std::time::Duration;
use async_trait::async_trait;
use redraft_core::{FinalOutcome, RiskTier, SessionRecord};
use serde_json::json;
use tracing::debug;

use super::{AuditSink, Result, SinkError};

/// Lowest risk tier that triggers a notification by default.
pub const DEFAULT_NOTIFY_TIER: RiskTier = RiskTier::High;

/// Webhook notifier for high-risk sessions.
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
    min_tier: RiskTier,
}

impl WebhookSink {
    /// Create a notifier posting to `url`.
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            url: url.into(),
            min_tier: DEFAULT_NOTIFY_TIER,
        }
    }

    /// Override the lowest tier that notifies.
    pub fn with_min_tier(mut self, min_tier: RiskTier) -> Self {
        self.min_tier = min_tier;
        self
    }

    /// Whether a record warrants a notification.
    pub fn should_notify(&self, record: &SessionRecord) -> bool {
        record.outcome == FinalOutcome::Fallback || RiskTier::from_score(record.risk_score) >= self.min_tier
    }

    fn message(record: &SessionRecord) -> String {
        let reasons = if record.reasons.is_empty() {
            "none".to_string()
        } else {
            record.reasons.join("; ")
        };
        format!(
            "Redraft session {} ended {} (risk {} {}, attempts {}). Reasons: {}",
            record.id,
            record.outcome,
            RiskTier::from_score(record.risk_score),
            record.risk_score,
            record.attempts,
            reasons
        )
    }
}

#[async_trait]
impl AuditSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn record(&self, record: &SessionRecord) -> Result<()> {
        if !self.should_notify(record) {
            debug!("Session {} below notify tier, skipping webhook", record.id);
            return Ok(());
        }

        let payload = json!({
            "text": Self::message(record),
            "record": record,
        });
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SinkError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Http(format!("webhook returned {}", status)));
        }
        debug!("Webhook notified for session {}", record.id);
        Ok(())
    }
}
