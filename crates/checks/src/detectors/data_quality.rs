use async_trait::async_trait;
use redraft_core::{category, Finding, Severity};
use regex::{Regex, RegexBuilder};
use serde_json::json;
use std::collections::HashMap;

use crate::check::{Check, CheckError};

const OVERCONFIDENT: &[&str] = &["always", "never", "guaranteed", "100%", "certainly"];
const MIN_CHARS: usize = 20;
const REPETITION_MIN_WORDS: usize = 10;
const REPETITION_SHARE: f64 = 0.2;
const HEURISTICS: f64 = 4.0;

/// Heuristic answer-quality check.
///
/// Looks for overconfident wording, placeholder markers, answers that are too
/// short and a single word dominating the text. Any hit is a FLAG.
pub struct DataQualityCheck {
    overconfident: Vec<(&'static str, Regex)>,
    placeholder: Option<Regex>,
}

impl DataQualityCheck {
    /// Compile the heuristics.
    pub fn new() -> Self {
        let overconfident = OVERCONFIDENT
            .iter()
            .filter_map(|term| {
                // `\b` does not match after `%`
                RegexBuilder::new(&format!(r"(?:^|\W){}(?:$|\W)", regex::escape(term)))
                    .case_insensitive(true)
                    .build()
                    .ok()
                    .map(|regex| (*term, regex))
            })
            .collect();
        let placeholder = RegexBuilder::new(r"lorem ipsum|\?\?\?|xxx|\btodo\b")
            .case_insensitive(true)
            .build()
            .ok();
        Self {
            overconfident,
            placeholder,
        }
    }

    fn repeated_words(text: &str) -> Vec<String> {
        let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
        if words.len() <= REPETITION_MIN_WORDS {
            return Vec::new();
        }
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for word in &words {
            *counts.entry(word.as_str()).or_default() += 1;
        }
        let limit = words.len() as f64 * REPETITION_SHARE;
        let mut repeated: Vec<String> = counts
            .into_iter()
            .filter(|(_, count)| *count as f64 > limit)
            .map(|(word, _)| word.to_string())
            .collect();
        repeated.sort();
        repeated
    }
}

impl Default for DataQualityCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Check for DataQualityCheck {
    fn category(&self) -> &str {
        category::DATA_QUALITY
    }

    async fn evaluate(&self, text: &str, _context: &str) -> Result<Finding, CheckError> {
        let mut triggered: Vec<&str> = Vec::new();

        let overconfident: Vec<&str> = self
            .overconfident
            .iter()
            .filter(|(_, regex)| regex.is_match(text))
            .map(|(term, _)| *term)
            .collect();
        if !overconfident.is_empty() {
            triggered.push("overconfidence");
        }
        if self.placeholder.as_ref().is_some_and(|r| r.is_match(text)) {
            triggered.push("placeholder");
        }
        if text.trim().chars().count() < MIN_CHARS {
            triggered.push("too_short");
        }
        let repeated = Self::repeated_words(text);
        if !repeated.is_empty() {
            triggered.push("repetition");
        }

        if triggered.is_empty() {
            return Ok(Finding::pass(category::DATA_QUALITY));
        }

        let score = triggered.len() as f64 / HEURISTICS;
        Ok(
            Finding::new(category::DATA_QUALITY, Severity::Flag, score, triggered.join(", "))
                .with_detail(json!({
                    "heuristics": triggered,
                    "overconfident_terms": overconfident.len(),
                    "repeated_words": repeated.len(),
                })),
        )
    }
}
