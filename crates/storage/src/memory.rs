//! In-process audit log.

use std::collections::VecDeque;
use async_trait::async_trait;
use redraft_core::SessionRecord;
use tokio::sync::Mutex;

use super::{AuditSink, Result};

/// Records kept by [`MemoryLog::new`].
pub const MEMORY_LOG_CAPACITY: usize = 200;

/// Bounded in-memory log of the latest session records.
pub struct MemoryLog {
    capacity: usize,
    records: Mutex<VecDeque<SessionRecord>>,
}

impl MemoryLog {
    /// Create a log keeping the latest 200 records.
    pub fn new() -> Self {
        Self::with_capacity(MEMORY_LOG_CAPACITY)
    }

    /// Create a log with a custom capacity (at least one record).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Latest records, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<SessionRecord> {
        let records = self.records.lock().await;
        records.iter().take(limit).cloned().collect()
    }

    /// Number of records held.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether the log is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditSink for MemoryLog {
    fn name(&self) -> &str {
        "memory"
    }

    async fn record(&self, record: &SessionRecord) -> Result<()> {
        let mut records = self.records.lock().await;
        records.push_front(record.clone());
        records.truncate(self.capacity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redraft_core::{AuditMode, FinalOutcome, SessionId};

    fn record(original: &str) -> SessionRecord {
        SessionRecord {
            id: SessionId::new(),
            original: original.to_string(),
            final_text: "ok".to_string(),
            outcome: FinalOutcome::Pass,
            risk_score: 0,
            reasons: Vec::new(),
            attempts: 0,
            mode: AuditMode::Output,
            cancelled: false,
            finished_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_newest_first() {
        let log = MemoryLog::new();
        log.record(&record("first")).await.unwrap();
        log.record(&record("second")).await.unwrap();

        let recent = log.recent(10).await;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].original, "second");
        assert_eq!(recent[1].original, "first");
    }

    #[tokio::test]
    async fn test_capacity_drops_oldest() {
        let log = MemoryLog::with_capacity(3);
        for i in 0..5 {
            log.record(&record(&format!("r{}", i))).await.unwrap();
        }

        assert_eq!(log.len().await, 3);
        let originals: Vec<String> = log.recent(10).await.into_iter().map(|r| r.original).collect();
        assert_eq!(originals, vec!["r4", "r3", "r2"]);
    }

    #[tokio::test]
    async fn test_default_capacity() {
        let log = MemoryLog::new();
        for i in 0..(MEMORY_LOG_CAPACITY + 10) {
            log.record(&record(&i.to_string())).await.unwrap();
        }
        assert_eq!(log.len().await, MEMORY_LOG_CAPACITY);
        assert!(!log.is_empty().await);
    }
}
