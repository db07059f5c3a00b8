//! Generation Gateway
//!
//! One capability interface for drafting, rewriting and LLM-judge
//! classification, plus an HTTP backend and a scripted backend.

#![warn(missing_docs)]

pub mod gateway;
pub mod http;
pub mod scripted;

pub use gateway::{GenerationGateway, GatewayError, non_empty, rewrite_prompt, with_timeout};
pub use http::HttpGateway;
pub use scripted::{ScriptedGateway, GatewayCall};
