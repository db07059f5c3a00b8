//! Remediation escalator.
//!
//! Turns a failed verdict into rewrite instructions. The tier depends only on
//! the attempt level, and every tier quotes the verdict's reasons back to the
//! generator.

use redraft_core::{AuditConfig, ConfigError, RewriteTier, Verdict};
use tracing::debug;

/// Phrase the generator is told to use when it refuses at the last tier.
pub const TIER3_REFUSAL: &str = "I cannot provide that information.";

/// Builds tiered rewrite instructions.
#[derive(Debug, Clone)]
pub struct RemediationEscalator {
    max_tier: u32,
    strict_max_words: u32,
}

impl RemediationEscalator {
    /// Build from a validated config.
    pub fn from_config(config: &AuditConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            max_tier: config.max_tier,
            strict_max_words: config.strict_max_words,
        })
    }

    /// Tier used for an attempt level.
    pub fn tier(&self, level: u32) -> RewriteTier {
        RewriteTier::for_level(level, self.max_tier)
    }

    /// Instructions for the rewrite at `level`.
    ///
    /// The prior draft itself is not embedded; the gateway appends it.
    pub fn build_instructions(&self, verdict: &Verdict, level: u32, user_prompt: Option<&str>) -> String {
        let tier = self.tier(level);
        debug!("Building {} rewrite instructions for level {}", tier, level);

        let header = match tier {
            RewriteTier::Soft => "You are a safety editor. Rewrite the response so the issues below are \
                 removed. Keep its meaning and roughly its length. Keep it neutral, factual \
                 and concise, with no personal data (names, phone numbers, addresses, SSNs, \
                 API keys), toxicity or stereotypes."
                .to_string(),
            RewriteTier::Strict => format!(
                "STRICT SAFETY MODE. Produce a neutral, factual answer with no names, numbers \
                 or personal data. Do not include unverifiable claims. If uncertain, state \
                 'I am unsure' or refuse politely. Keep it under {} words.",
                self.strict_max_words
            ),
            RewriteTier::UltraStrict => format!(
                "ULTRA-STRICT MODE. Return a short, generic answer with safe, neutral \
                 phrasing and no entities or numbers. If the request risks revealing \
                 personal, sensitive or harmful information, refuse with exactly: '{}'",
                TIER3_REFUSAL
            ),
        };

        let mut instructions = header;
        instructions.push_str("\n\nIssues found in the previous draft:\n");
        if verdict.reasons.is_empty() {
            instructions.push_str(&format!("- overall outcome {}\n", verdict.outcome));
        } else {
            for reason in &verdict.reasons {
                instructions.push_str(&format!("- {}\n", reason));
            }
        }

        if let Some(prompt) = user_prompt.filter(|p| !p.trim().is_empty()) {
            instructions.push_str(&format!("\nUser prompt: {}\n", prompt.trim()));
        }

        instructions.push_str(match tier {
            RewriteTier::Soft => "\nRewrite this response safely.",
            RewriteTier::Strict => "\nRewrite safely.",
            RewriteTier::UltraStrict => "\nRewrite or refuse.",
        });
        instructions
    }
}
