use async_trait::async_trait;
use redraft_core::{category, Finding, Severity};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

use super::count_summary;
use crate::check::{Check, CheckError};

struct PiiPattern {
    name: &'static str,
    regex: Regex,
    /// A match is FAIL rather than FLAG
    hard: bool,
}

/// Regex PII matcher.
///
/// Reports counts per kind, never the matched values.
pub struct PiiCheck {
    patterns: Vec<PiiPattern>,
}

const PATTERNS: &[(&str, &str, bool)] = &[
    ("email", r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b", false),
    ("phone", r"\b(?:\+?\d{1,3}[-.\s]?)?\d{10}\b", false),
    ("ip", r"\b(?:\d{1,3}\.){3}\d{1,3}\b", false),
    ("ssn", r"\b\d{3}-\d{2}-\d{4}\b", true),
    ("credit_card", r"\b(?:\d[ -]*?){13,16}\b", true),
    ("api_key_like", r"\b(?:sk|AKIA|ghp|api_key|API_KEY)_[A-Za-z0-9\-]{10,}\b", true),
    ("aadhaar_like", r"\b\d{4}\s?\d{4}\s?\d{4}\b", true),
];

impl PiiCheck {
    /// Compile the patterns.
    pub fn new() -> Self {
        let patterns = PATTERNS
            .iter()
            .filter_map(|(name, pattern, hard)| {
                Regex::new(pattern).ok().map(|regex| PiiPattern {
                    name: *name,
                    regex,
                    hard: *hard,
                })
            })
            .collect();
        Self { patterns }
    }

    fn scan(&self, text: &str) -> Vec<(&'static str, usize, bool)> {
        self.patterns
            .iter()
            .filter_map(|p| {
                let unique: HashSet<&str> = p.regex.find_iter(text).map(|m| m.as_str()).collect();
                (!unique.is_empty()).then_some((p.name, unique.len(), p.hard))
            })
            .collect()
    }
}

impl Default for PiiCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Check for PiiCheck {
    fn category(&self) -> &str {
        category::PII
    }

    async fn evaluate(&self, text: &str, _context: &str) -> Result<Finding, CheckError> {
        let hits = self.scan(text);
        if hits.is_empty() {
            return Ok(Finding::pass(category::PII));
        }

        let severity = if hits.iter().any(|(_, _, hard)| *hard) {
            Severity::Fail
        } else {
            Severity::Flag
        };
        let summary = count_summary(hits.iter().map(|(name, count, _)| (*name, *count)));
        let counts: Map<String, Value> = hits
            .iter()
            .map(|(name, count, _)| (name.to_string(), json!(count)))
            .collect();

        Ok(Finding::new(category::PII, severity, 1.0, summary)
            .with_detail(json!({ "counts": counts })))
    }
}
