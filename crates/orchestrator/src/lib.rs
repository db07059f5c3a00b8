//! Audit-remediate orchestrator.
//!
//! Drives one session at a time through evaluate, escalate and rewrite until
//! the candidate passes or the retry budget runs out:
//! ```text
//! Draft → Evaluate → (PASS) Release
//!            ↓ FLAG/FAIL
//!         Escalate → Rewrite → Evaluate → ...
//!            ↓ budget exhausted
//!         Fallback refusal
//! ```

#![warn(missing_docs)]

mod state;
mod orchestrator;

pub use state::{SessionState, StateError};
pub use orchestrator::Orchestrator;

pub use tokio_util::sync::CancellationToken;
