use std::sync::Arc;
use async_trait::async_trait;
use redraft_core::{category, Finding, Severity};
use redraft_gateway::GenerationGateway;
use serde_json::json;
use tracing::debug;

use crate::check::{Check, CheckError};

/// LLM-judge fact check.
///
/// Asks the gateway to label the text PASS, FLAG or FAIL. Any other answer is
/// treated as FLAG. Gateway errors make the check unavailable.
pub struct HallucinationCheck {
    gateway: Arc<dyn GenerationGateway>,
}

impl HallucinationCheck {
    /// Create a judge over a gateway.
    pub fn new(gateway: Arc<dyn GenerationGateway>) -> Self {
        Self { gateway }
    }

    fn judge_prompt(text: &str, context: &str) -> String {
        let mut prompt = String::from(
            "You are a fact-checking classifier.\n\
             Classify the following statement strictly as one of:\n\
             PASS = factually correct\n\
             FLAG = possibly incorrect / uncertain\n\
             FAIL = factually wrong\n\n",
        );
        if !context.trim().is_empty() {
            prompt.push_str(&format!("Context: {}\n\n", context.trim()));
        }
        prompt.push_str(&format!(
            "Statement: {}\n\nAnswer with only PASS, FLAG, or FAIL.",
            text
        ));
        prompt
    }

    fn parse_label(answer: &str) -> (Severity, bool) {
        let label = answer
            .split_whitespace()
            .next()
            .unwrap_or("")
            .trim_matches(|c: char| !c.is_ascii_alphabetic())
            .to_ascii_uppercase();
        match label.as_str() {
            "PASS" => (Severity::Pass, true),
            "FLAG" => (Severity::Flag, true),
            "FAIL" => (Severity::Fail, true),
            _ => (Severity::Flag, false),
        }
    }
}

#[async_trait]
impl Check for HallucinationCheck {
    fn category(&self) -> &str {
        category::HALLUCINATION
    }

    async fn evaluate(&self, text: &str, context: &str) -> Result<Finding, CheckError> {
        let answer = self
            .gateway
            .classify(&Self::judge_prompt(text, context))
            .await
            .map_err(|e| CheckError::Unavailable(e.to_string()))?;

        let (severity, recognized) = Self::parse_label(&answer);
        if !recognized {
            debug!("Hallucination judge gave an unrecognized label, treating as FLAG");
        }

        let (score, summary) = match severity {
            Severity::Pass => (0.0, String::new()),
            Severity::Flag if !recognized => (0.5, "hallucination(unclear)".to_string()),
            Severity::Flag => (0.5, "hallucination(uncertain)".to_string()),
            Severity::Fail => (0.9, "hallucination(incorrect)".to_string()),
        };
        Ok(Finding::new(category::HALLUCINATION, severity, score, summary)
            .with_detail(json!({ "recognized": recognized })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redraft_gateway::{GatewayCall, GatewayError, ScriptedGateway};

    #[tokio::test]
    async fn test_labels_map_to_severity() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .with_label("PASS")
                .with_label("flag.")
                .with_label("FAIL - the moon is not cheese"),
        );
        let check = HallucinationCheck::new(gateway);

        let pass = check.evaluate("Water boils at 100C at sea level.", "").await.unwrap();
        let flag = check.evaluate("Maybe true.", "").await.unwrap();
        let fail = check.evaluate("The moon is cheese.", "").await.unwrap();

        assert_eq!(pass.severity, Severity::Pass);
        assert_eq!(flag.severity, Severity::Flag);
        assert_eq!(fail.severity, Severity::Fail);
        assert!((fail.score - 0.9).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unrecognized_label_is_flag() {
        let gateway = Arc::new(ScriptedGateway::new().with_label("I think so"));
        let finding = HallucinationCheck::new(gateway)
            .evaluate("text", "")
            .await
            .unwrap();
        assert_eq!(finding.severity, Severity::Flag);
        assert_eq!(finding.summary, "hallucination(unclear)");
    }

    #[tokio::test]
    async fn test_gateway_error_is_unavailable() {
        let gateway = Arc::new(ScriptedGateway::new().with_classify_error(GatewayError::EmptyResponse));
        let result = HallucinationCheck::new(gateway).evaluate("text", "").await;
        assert!(matches!(result, Err(CheckError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_prompt_carries_statement_and_context() {
        let gateway = Arc::new(ScriptedGateway::new().with_label("PASS"));
        let check = HallucinationCheck::new(gateway.clone());
        check.evaluate("Rust 1.0 shipped in 2015.", "release history").await.unwrap();

        match &gateway.calls()[0] {
            GatewayCall::Classify(prompt) => {
                assert!(prompt.starts_with("You are a fact-checking classifier."));
                assert!(prompt.contains("Context: release history"));
                assert!(prompt.contains("Statement: Rust 1.0 shipped in 2015."));
            }
            other => panic!("unexpected call {:?}", other),
        }
    }
}
