//! Deterministic in-process gateway.
//!
//! Replays queued responses in order. Used by tests and by the CLI when no
//! backend is configured; an exhausted queue answers with a transport error.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::gateway::{non_empty, GatewayError, GenerationGateway};

/// Gateway replaying scripted responses.
#[derive(Default)]
pub struct ScriptedGateway {
    generate: Mutex<VecDeque<Result<String, GatewayError>>>,
    rewrite: Mutex<VecDeque<Result<String, GatewayError>>>,
    classify: Mutex<VecDeque<Result<String, GatewayError>>>,
    calls: Mutex<Vec<GatewayCall>>,
    delay: Option<Duration>,
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    /// `generate(prompt)`
    Generate(String),
    /// `rewrite(instructions, prior_text)`
    Rewrite {
        /// Instructions passed
        instructions: String,
        /// Prior candidate passed
        prior_text: String,
    },
    /// `classify(prompt)`
    Classify(String),
}

impl ScriptedGateway {
    /// Create a gateway with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a draft.
    pub fn with_draft(self, text: impl Into<String>) -> Self {
        push(&self.generate, Ok(text.into()));
        self
    }

    /// Queue a rewrite.
    pub fn with_rewrite(self, text: impl Into<String>) -> Self {
        push(&self.rewrite, Ok(text.into()));
        self
    }

    /// Queue a failing rewrite.
    pub fn with_rewrite_error(self, error: GatewayError) -> Self {
        push(&self.rewrite, Err(error));
        self
    }

    /// Queue a classification answer.
    pub fn with_label(self, label: impl Into<String>) -> Self {
        push(&self.classify, Ok(label.into()));
        self
    }

    /// Queue a failing classification.
    pub fn with_classify_error(self, error: GatewayError) -> Self {
        push(&self.classify, Err(error));
        self
    }

    /// Sleep before every answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of rewrite calls received so far.
    pub fn rewrite_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GatewayCall::Rewrite { .. }))
            .count()
    }

    async fn answer(
        &self,
        queue: &Mutex<VecDeque<Result<String, GatewayError>>>,
        call: GatewayCall,
    ) -> Result<String, GatewayError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match next {
            Some(Ok(text)) => non_empty(text),
            Some(Err(e)) => Err(e),
            None => Err(GatewayError::Transport("no scripted response".to_string())),
        }
    }
}

fn push(queue: &Mutex<VecDeque<Result<String, GatewayError>>>, item: Result<String, GatewayError>) {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push_back(item);
}

#[async_trait]
impl GenerationGateway for ScriptedGateway {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        self.answer(&self.generate, GatewayCall::Generate(prompt.to_string()))
            .await
    }

    async fn rewrite(&self, instructions: &str, prior_text: &str) -> Result<String, GatewayError> {
        let call = GatewayCall::Rewrite {
            instructions: instructions.to_string(),
            prior_text: prior_text.to_string(),
        };
        self.answer(&self.rewrite, call).await
    }

    async fn classify(&self, prompt: &str) -> Result<String, GatewayError> {
        self.answer(&self.classify, GatewayCall::Classify(prompt.to_string()))
            .await
    }
}
