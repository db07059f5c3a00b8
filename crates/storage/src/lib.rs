//! Audit sinks for Redraft.
//!
//! A sink receives the flat record of every finished session. The
//! orchestrator never waits on sinks, so a slow or failing sink cannot change
//! a session's result.

#![warn(missing_docs)]

pub mod sink;
pub mod memory;
pub mod jsonl;
pub mod webhook;

pub use sink::{AuditSink, SinkError, Result};
pub use memory::{MemoryLog, MEMORY_LOG_CAPACITY};
pub use jsonl::JsonlSink;
pub use webhook::{WebhookSink, DEFAULT_NOTIFY_TIER};
