//! Signal collector.
//!
//! Runs every enabled check concurrently against one candidate text and
//! returns exactly one finding per enabled category, in registration order.
//! A check that errors, panics or misses its deadline is replaced by the
//! category's fallback finding.

use std::sync::Arc;
use std::time::Duration;
use redraft_core::{AuditConfig, ConfigError, Finding, Severity};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::check::Check;
use crate::registry::CheckRegistry;

struct CollectorEntry {
    category: String,
    check: Arc<dyn Check>,
    fallback_severity: Severity,
}

/// Concurrent check runner.
pub struct SignalCollector {
    entries: Vec<CollectorEntry>,
    check_timeout: Duration,
    step_timeout: Duration,
}

impl SignalCollector {
    /// Build from the enabled categories of a config.
    ///
    /// Fails when the config is invalid or an enabled category has no
    /// registered check.
    pub fn from_config(config: &AuditConfig, registry: &CheckRegistry) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut entries = Vec::new();
        for category in config.enabled_categories() {
            let check = registry
                .get(category)
                .ok_or_else(|| ConfigError::MissingCheck(category.to_string()))?;
            entries.push(CollectorEntry {
                category: category.to_string(),
                check,
                fallback_severity: config.fallback_severity(category),
            });
        }

        Ok(Self {
            entries,
            check_timeout: config.check_timeout(),
            step_timeout: config.step_timeout(),
        })
    }

    /// Enabled categories in registration order.
    pub fn categories(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.category.as_str()).collect()
    }

    /// Evaluate a text with every enabled check.
    ///
    /// Returns one finding per enabled category. Never returns early with a
    /// partial set: every slot is either a real finding or a fallback.
    pub async fn evaluate(&self, text: &str, context: &str) -> Vec<Finding> {
        let text: Arc<str> = Arc::from(text);
        let context: Arc<str> = Arc::from(context);

        let started = Instant::now();
        let step_deadline = started + self.step_timeout;
        let check_deadline = (started + self.check_timeout).min(step_deadline);

        // Dropping the set aborts every outstanding check.
        let mut tasks = JoinSet::new();
        for (index, entry) in self.entries.iter().enumerate() {
            let check = Arc::clone(&entry.check);
            let text = Arc::clone(&text);
            let context = Arc::clone(&context);
            debug!("Running check: {}", entry.category);
            tasks.spawn(async move {
                let outcome =
                    tokio::time::timeout_at(check_deadline, check.evaluate(&text, &context)).await;
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<Finding>> = (0..self.entries.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(Ok(mut finding)))) => {
                    let entry = &self.entries[index];
                    if finding.category != entry.category {
                        debug!(
                            "Check for {} reported category {}, normalizing",
                            entry.category, finding.category
                        );
                        finding.category = entry.category.clone();
                    }
                    debug!("Check {} finished: {}", entry.category, finding.severity);
                    slots[index] = Some(finding);
                }
                Ok((index, Ok(Err(e)))) => {
                    warn!(
                        "Check {} failed, substituting fallback: {}",
                        self.entries[index].category, e
                    );
                }
                Ok((index, Err(_))) => {
                    warn!(
                        "Check {} timed out after {:?}, substituting fallback",
                        self.entries[index].category,
                        started.elapsed()
                    );
                }
                Err(e) => {
                    warn!("Check task aborted, substituting fallback: {}", e);
                }
            }
        }

        slots
            .into_iter()
            .zip(&self.entries)
            .map(|(slot, entry)| {
                slot.unwrap_or_else(|| Finding::fallback(&entry.category, entry.fallback_severity))
            })
            .collect()
    }
}
