//! JSON Lines audit log.
//!
//! Appends one JSON object per finished session. Writes are serialized so
//! concurrent sessions never interleave within a line.

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use redraft_core::SessionRecord;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{AuditSink, Result};

/// Append-only JSONL file sink.
pub struct JsonlSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlSink {
    /// Create a sink writing to `path`. Parent directories are created on
    /// first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record from a JSONL file, skipping blank lines.
    pub async fn read_all(path: impl AsRef<Path>) -> Result<Vec<SessionRecord>> {
        let raw = fs::read_to_string(path).await?;
        let mut records = Vec::new();
        for line in raw.lines().filter(|l| !l.trim().is_empty()) {
            records.push(serde_json::from_str(line)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl AuditSink for JsonlSink {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn record(&self, record: &SessionRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
