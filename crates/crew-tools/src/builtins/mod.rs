//! Builtins - Built-in tools for Research Crew
//!
//! - Search tool: web_search

mod web_search;

pub use web_search::{WebSearchTool, WEB_SEARCH_TOOL_NAME};

use crate::registry::ToolRegistry;
use crate::search::{SearchProvider, DEFAULT_MAX_RESULTS};
use std::sync::Arc;

/// Configuration for built-in tools
#[derive(Clone)]
pub struct BuiltinsConfig {
    /// Search backend; `web_search` is only registered when set
    pub search: Option<Arc<dyn SearchProvider>>,
    /// Hits returned per search query
    pub search_max_results: usize,
}

impl Default for BuiltinsConfig {
    fn default() -> Self {
        Self {
            search: None,
            search_max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl std::fmt::Debug for BuiltinsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinsConfig")
            .field("search", &self.search.as_ref().map(|p| p.name().to_string()))
            .field("search_max_results", &self.search_max_results)
            .finish()
    }
}

impl BuiltinsConfig {
    /// Use the given search backend
    #[must_use]
    pub fn with_search(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(provider);
        self
    }

    /// Set hits per query
    #[must_use]
    pub fn with_search_max_results(mut self, max_results: usize) -> Self {
        self.search_max_results = max_results;
        self
    }
}

/// Register the built-in tools enabled by `config`
pub fn register_builtins(registry: &mut ToolRegistry, config: &BuiltinsConfig) {
    if let Some(provider) = &config.search {
        registry.register(Arc::new(
            WebSearchTool::new(Arc::clone(provider)).with_max_results(config.search_max_results),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{DuckDuckGoConfig, DuckDuckGoSearch};

    #[test]
    fn test_register_builtins_without_search() {
        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry, &BuiltinsConfig::default());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_builtins_with_search() {
        let search = DuckDuckGoSearch::new(DuckDuckGoConfig::default()).unwrap();
        let config = BuiltinsConfig::default().with_search(Arc::new(search));

        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry, &config);
        assert_eq!(registry.list_names(), vec![WEB_SEARCH_TOOL_NAME]);
    }
}
