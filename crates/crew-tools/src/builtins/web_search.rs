//! Web search tool: pass-through to a [`SearchProvider`]
//!
//! The model only supplies a `query` string. Provider failures come back as
//! a failed [`ToolResult`] so the calling agent can continue without data.

use crate::error::{Error, Result};
use crate::registry::{Tool, ToolCategory, ToolDefinition, ToolResult};
use crate::search::{format_hits, SearchProvider, DEFAULT_MAX_RESULTS, MAX_RESULTS_CAP};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Tool name exposed to the model
pub const WEB_SEARCH_TOOL_NAME: &str = "web_search";

/// Web search tool backed by a search provider
pub struct WebSearchTool {
    definition: ToolDefinition,
    provider: Arc<dyn SearchProvider>,
    max_results: usize,
}

impl WebSearchTool {
    /// Create a new web search tool
    #[must_use]
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        let definition = ToolDefinition::new(
            WEB_SEARCH_TOOL_NAME,
            "Search the web for real-time signals. Returns titles, URLs, and snippets. \
             Use this tool for recent news, market signals, quotes and sources.",
        )
        .with_category(ToolCategory::Search)
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query string"
                }
            },
            "required": ["query"]
        }));

        Self {
            definition,
            provider,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Set how many hits each query returns
    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.clamp(1, MAX_RESULTS_CAP);
        self
    }
}

#[async_trait::async_trait]
impl Tool for WebSearchTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();

        let query = input
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidInput("Missing 'query' parameter".to_string()))?;

        if query.trim().is_empty() {
            return Err(Error::InvalidInput("Query must not be empty".to_string()));
        }

        debug!(provider = %self.provider.name(), query = %query, "Running web search");

        match self.provider.search(query, self.max_results).await {
            Ok(hits) => Ok(ToolResult::success(
                serde_json::Value::String(format_hits(query, &hits)),
                start.elapsed().as_millis() as u64,
            )),
            Err(e) => {
                warn!(provider = %self.provider.name(), error = %e, "Search provider failed");
                Ok(ToolResult::failure(
                    format!("search failed: {e}"),
                    start.elapsed().as_millis() as u64,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchHit;

    struct StaticSearch {
        hits: Vec<SearchHit>,
    }

    #[async_trait::async_trait]
    impl SearchProvider for StaticSearch {
        fn name(&self) -> &str {
            "static"
        }

        async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
            Ok(self.hits.iter().take(max_results).cloned().collect())
        }
    }

    struct DownSearch;

    #[async_trait::async_trait]
    impl SearchProvider for DownSearch {
        fn name(&self) -> &str {
            "down"
        }

        async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchHit>> {
            Err(Error::Network("connection refused".to_string()))
        }
    }

    fn hit(n: usize) -> SearchHit {
        SearchHit {
            title: format!("Signal {n}"),
            url: format!("https://example.com/{n}"),
            snippet: format!("Quote {n}"),
        }
    }

    #[test]
    fn test_definition() {
        let tool = WebSearchTool::new(Arc::new(DownSearch));
        let def = tool.definition();
        assert_eq!(def.name, "web_search");
        assert_eq!(def.category, ToolCategory::Search);
        assert_eq!(def.parameters["required"][0], "query");
    }

    #[tokio::test]
    async fn test_success_returns_text() {
        let tool = WebSearchTool::new(Arc::new(StaticSearch {
            hits: (1..=3).map(hit).collect(),
        }))
        .with_max_results(2);

        let result = tool
            .execute(serde_json::json!({"query": "AI trends 2026"}))
            .await
            .unwrap();

        assert!(result.success);
        let text = result.to_model_text();
        assert!(text.contains("Signal 1"));
        assert!(text.contains("https://example.com/2"));
        assert!(!text.contains("Signal 3"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_not_fatal() {
        let tool = WebSearchTool::new(Arc::new(DownSearch));
        let result = tool
            .execute(serde_json::json!({"query": "AI trends"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.to_model_text().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_missing_query() {
        let tool = WebSearchTool::new(Arc::new(DownSearch));
        assert!(tool.execute(serde_json::json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_query() {
        let tool = WebSearchTool::new(Arc::new(DownSearch));
        let result = tool.execute(serde_json::json!({"query": "  "})).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
