use async_trait::async_trait;
use redraft_core::{category, CheckPolicy, Finding};
use regex::{Regex, RegexBuilder};
use serde_json::json;
use std::collections::HashSet;

use crate::check::{Check, CheckError};

const LEXICON: &[&str] = &[
    "idiot", "stupid", "hate", "racist", "sexist", "dumb", "kill yourself",
    "loser", "ugly", "trash",
];

/// Lexicon-based toxicity matcher.
///
/// Each distinct term halves the remaining headroom, so the score is
/// `1 - 0.5^hits`.
pub struct ToxicityCheck {
    lexicon: Vec<Regex>,
    policy: CheckPolicy,
}

impl ToxicityCheck {
    /// Build with the thresholds of the given policy.
    pub fn new(policy: CheckPolicy) -> Self {
        let lexicon = LEXICON
            .iter()
            .filter_map(|term| {
                RegexBuilder::new(&format!(r"\b{}\b", regex::escape(term)))
                    .case_insensitive(true)
                    .build()
                    .ok()
            })
            .collect();
        Self { lexicon, policy }
    }

    fn score(hits: usize) -> f64 {
        1.0 - 0.5f64.powi(hits.min(64) as i32)
    }
}

#[async_trait]
impl Check for ToxicityCheck {
    fn category(&self) -> &str {
        category::TOXICITY
    }

    async fn evaluate(&self, text: &str, _context: &str) -> Result<Finding, CheckError> {
        let terms: HashSet<String> = self
            .lexicon
            .iter()
            .flat_map(|regex| regex.find_iter(text))
            .map(|m| m.as_str().to_lowercase())
            .collect();
        if terms.is_empty() {
            return Ok(Finding::pass(category::TOXICITY));
        }

        let score = Self::score(terms.len());
        let severity = self.policy.severity_for(score);
        Ok(
            Finding::new(category::TOXICITY, severity, score, format!("toxic({})", terms.len()))
                .with_detail(json!({ "hits": terms.len() })),
        )
    }
}
