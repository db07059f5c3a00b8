use async_trait::async_trait;
use redraft_core::{category, Finding, Severity};
use regex::{Regex, RegexBuilder};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

use super::count_summary;
use crate::check::{Check, CheckError};

const FAMILIES: &[(&str, &str)] = &[
    ("malware", r"\b(malware|virus|trojan|worm|ransomware)\b"),
    ("hacking", r"\b(hack|exploit|backdoor|keylogger|rootkit|ddos|sql injection)\b"),
    ("weapons", r"\b(bomb|explosive|weapon|poison|grenade|firearm)\b"),
    ("violence", r"\b(kill|murder|terrorist|attack|shoot)\b"),
    ("fraud", r"\b(credit card skimmer|phishing|forgery|identity theft)\b"),
];

/// Malicious-instruction matcher. Any hit is a hard FAIL.
pub struct SecurityCheck {
    families: Vec<(&'static str, Regex)>,
}

impl SecurityCheck {
    /// Compile the keyword families.
    pub fn new() -> Self {
        let families = FAMILIES
            .iter()
            .filter_map(|(name, pattern)| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .ok()
                    .map(|regex| (*name, regex))
            })
            .collect();
        Self { families }
    }
}

impl Default for SecurityCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Check for SecurityCheck {
    fn category(&self) -> &str {
        category::SECURITY
    }

    async fn evaluate(&self, text: &str, _context: &str) -> Result<Finding, CheckError> {
        let hits: Vec<(&str, usize)> = self
            .families
            .iter()
            .filter_map(|(name, regex)| {
                let terms: HashSet<String> = regex
                    .find_iter(text)
                    .map(|m| m.as_str().to_lowercase())
                    .collect();
                (!terms.is_empty()).then_some((*name, terms.len()))
            })
            .collect();

        if hits.is_empty() {
            return Ok(Finding::pass(category::SECURITY));
        }

        let counts: Map<String, Value> = hits
            .iter()
            .map(|(name, count)| (name.to_string(), json!(count)))
            .collect();
        Ok(Finding::new(category::SECURITY, Severity::Fail, 1.0, count_summary(hits))
            .with_detail(json!({ "counts": counts })))
    }
}
