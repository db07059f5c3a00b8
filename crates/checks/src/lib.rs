//! Redraft safety checks.
//!
//! The [`Check`] trait, a registry of check instances, the concurrent
//! [`SignalCollector`] and the reference detectors.

#![warn(missing_docs)]

mod check;
mod registry;
mod collector;
pub mod detectors;

pub use check::{Check, CheckError};
pub use registry::CheckRegistry;
pub use collector::SignalCollector;
pub use detectors::default_registry;
