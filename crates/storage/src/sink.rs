//! Sink trait abstraction.

use async_trait::async_trait;
use redraft_core::SessionRecord;

/// Error type for sink operations.
pub type Result<T> = std::result::Result<T, SinkError>;

/// Errors that can occur while recording a session.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Notification endpoint error
    #[error("HTTP error: {0}")]
    Http(String),
}

/// Destination for finished session records.
///
/// Implementations must tolerate concurrent calls from independent sessions.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Record one finished session.
    async fn record(&self, record: &SessionRecord) -> Result<()>;
}
