use async_trait::async_trait;
use redraft_core::{category, CheckPolicy, Finding};
use regex::{Regex, RegexBuilder};
use serde_json::json;

use crate::check::{Check, CheckError};

const HARM_PROBABILITY: f64 = 0.9;
const BASELINE_PROBABILITY: f64 = 0.01;

const KEYWORDS: &[&str] = &[
    r"make a bomb",
    r"build a weapon",
    r"kill (?:someone|somebody|a person|people)",
    r"hurt (?:someone|somebody|myself|yourself)",
    r"self[- ]harm",
    r"suicide",
    r"poison (?:someone|somebody|a person)",
    r"buy (?:illegal )?drugs",
    r"steal (?:a|someone'?s) identity",
];

/// Keyword harm classifier.
///
/// Produces a harm probability, mapped onto a severity with the category's
/// thresholds.
pub struct HarmfulCheck {
    keywords: Option<Regex>,
    policy: CheckPolicy,
}

impl HarmfulCheck {
    /// Build with the thresholds of the given policy.
    pub fn new(policy: CheckPolicy) -> Self {
        let keywords = RegexBuilder::new(&format!(r"\b(?:{})\b", KEYWORDS.join("|")))
            .case_insensitive(true)
            .build()
            .ok();
        Self { keywords, policy }
    }

    /// Probability that a text asks for or contains harmful content.
    pub fn probability(&self, text: &str) -> f64 {
        match &self.keywords {
            Some(regex) if regex.is_match(text) => HARM_PROBABILITY,
            _ => BASELINE_PROBABILITY,
        }
    }
}

#[async_trait]
impl Check for HarmfulCheck {
    fn category(&self) -> &str {
        category::HARMFUL
    }

    async fn evaluate(&self, text: &str, _context: &str) -> Result<Finding, CheckError> {
        let probability = self.probability(text);
        let severity = self.policy.severity_for(probability);
        let summary = if severity.is_actionable() {
            format!("harmful(p={:.2})", probability)
        } else {
            String::new()
        };
        Ok(Finding::new(category::HARMFUL, severity, probability, summary)
            .with_detail(json!({ "probability": probability })))
    }
}
