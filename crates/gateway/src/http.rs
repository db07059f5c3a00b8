//! HTTP generation backend.
//!
//! Talks to an Ollama-compatible `/api/generate` endpoint. Drafts, rewrites
//! and classification prompts all go through the same completion call.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::gateway::{non_empty, rewrite_prompt, GatewayError, GenerationGateway};

/// Ollama-style completion client.
#[derive(Clone)]
pub struct HttpGateway {
    /// HTTP client
    client: Client,

    /// Server URL
    url: String,

    /// Model name
    model: String,

    /// Client-side request timeout
    timeout: Duration,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl HttpGateway {
    /// Create a new client.
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_timeout(url, model, Duration::from_secs(120))
    }

    /// Create a new client with a request timeout.
    pub fn with_timeout(url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            url: url.into(),
            model: model.into(),
            timeout,
        }
    }

    /// Model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.url.trim_end_matches('/'))
    }

    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        let payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        debug!("Requesting completion from {} ({} prompt chars)", self.model, prompt.len());

        let response = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status { status, body });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| self.transport_error(e))?;

        non_empty(body.response)
    }

    fn transport_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout(self.timeout)
        } else {
            GatewayError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl GenerationGateway for HttpGateway {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        self.complete(prompt).await
    }

    async fn rewrite(&self, instructions: &str, prior_text: &str) -> Result<String, GatewayError> {
        self.complete(&rewrite_prompt(instructions, prior_text)).await
    }

    async fn classify(&self, prompt: &str) -> Result<String, GatewayError> {
        self.complete(prompt).await
    }
}
