//! Reference detectors.
//!
//! Regex and lexicon detectors run in-process; the hallucination judge goes
//! through the generation gateway.

mod pii;
mod security;
mod toxicity;
mod data_quality;
mod harmful;
mod hallucination;

pub use pii::PiiCheck;
pub use security::SecurityCheck;
pub use toxicity::ToxicityCheck;
pub use data_quality::DataQualityCheck;
pub use harmful::HarmfulCheck;
pub use hallucination::HallucinationCheck;

use std::sync::Arc;
use redraft_core::{category, AuditConfig, CheckPolicy};
use redraft_gateway::GenerationGateway;

use crate::registry::CheckRegistry;

/// Registry with every reference detector.
///
/// The hallucination judge is registered only when a gateway is given.
pub fn default_registry(
    config: &AuditConfig,
    gateway: Option<Arc<dyn GenerationGateway>>,
) -> CheckRegistry {
    let policy = |name: &str| {
        config
            .policy(name)
            .cloned()
            .unwrap_or_else(|| CheckPolicy::new(name))
    };

    let mut registry = CheckRegistry::new()
        .with(Arc::new(PiiCheck::new()))
        .with(Arc::new(SecurityCheck::new()))
        .with(Arc::new(ToxicityCheck::new(policy(category::TOXICITY))))
        .with(Arc::new(DataQualityCheck::new()))
        .with(Arc::new(HarmfulCheck::new(policy(category::HARMFUL))));

    if let Some(gateway) = gateway {
        registry.register(Arc::new(HallucinationCheck::new(gateway)));
    }
    registry
}

/// Render `name(count)` pairs, e.g. `email(1), ssn(2)`.
pub(crate) fn count_summary<'a>(counts: impl IntoIterator<Item = (&'a str, usize)>) -> String {
    counts
        .into_iter()
        .map(|(name, count)| format!("{}({})", name, count))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use redraft_gateway::ScriptedGateway;

    #[test]
    fn test_count_summary() {
        assert_eq!(count_summary([("email", 1), ("ssn", 2)]), "email(1), ssn(2)");
        assert_eq!(count_summary(Vec::<(&str, usize)>::new()), "");
    }

    #[test]
    fn test_default_registry_covers_default_config() {
        let config = AuditConfig::default();
        let registry = default_registry(&config, None);
        for category in config.enabled_categories() {
            assert!(registry.contains(category), "missing {}", category);
        }
        assert!(!registry.contains(category::HALLUCINATION));
    }

    #[test]
    fn test_gateway_enables_hallucination_judge() {
        let gateway: Arc<dyn GenerationGateway> = Arc::new(ScriptedGateway::new());
        let registry = default_registry(&AuditConfig::default(), Some(gateway));
        assert!(registry.contains(category::HALLUCINATION));
    }
}
