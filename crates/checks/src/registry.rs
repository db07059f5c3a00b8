//! Check registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::check::Check;

/// Registry of check instances, keyed by category.
pub struct CheckRegistry {
    checks: HashMap<String, Arc<dyn Check>>,
}

impl CheckRegistry {
    /// Create a new registry.
    pub fn new() -> Self {
        Self {
            checks: HashMap::new(),
        }
    }

    /// Register a check, returning the one it replaced.
    pub fn register(&mut self, check: Arc<dyn Check>) -> Option<Arc<dyn Check>> {
        let category = check.category().to_string();
        self.checks.insert(category, check)
    }

    /// Builder form of [`CheckRegistry::register`].
    pub fn with(mut self, check: Arc<dyn Check>) -> Self {
        self.register(check);
        self
    }

    /// Unregister a check.
    pub fn unregister(&mut self, category: &str) -> Option<Arc<dyn Check>> {
        self.checks.remove(category)
    }

    /// Get a check by category.
    pub fn get(&self, category: &str) -> Option<Arc<dyn Check>> {
        self.checks.get(category).cloned()
    }

    /// Whether a category has a check.
    pub fn contains(&self, category: &str) -> bool {
        self.checks.contains_key(category)
    }

    /// Registered categories, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self.checks.keys().map(String::as_str).collect();
        categories.sort_unstable();
        categories
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::CheckError;
    use async_trait::async_trait;
    use redraft_core::Finding;

    struct Named(&'static str);

    #[async_trait]
    impl Check for Named {
        fn category(&self) -> &str {
            self.0
        }

        async fn evaluate(&self, _text: &str, _context: &str) -> Result<Finding, CheckError> {
            Ok(Finding::pass(self.0))
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = CheckRegistry::new();
        assert!(registry.register(Arc::new(Named("pii"))).is_none());
        assert!(registry.register(Arc::new(Named("pii"))).is_some());
        assert!(registry.contains("pii"));
        assert!(registry.get("security").is_none());
    }

    #[test]
    fn test_categories_sorted() {
        let registry = CheckRegistry::new()
            .with(Arc::new(Named("toxicity")))
            .with(Arc::new(Named("pii")));
        assert_eq!(registry.categories(), vec!["pii", "toxicity"]);
    }

    #[test]
    fn test_unregister() {
        let mut registry = CheckRegistry::new().with(Arc::new(Named("pii")));
        assert!(registry.unregister("pii").is_some());
        assert!(registry.unregister("pii").is_none());
    }
}
