//! Search - web search provider abstraction
//!
//! The `web_search` tool depends on [`SearchProvider`] rather than on a
//! concrete backend, so tests can swap in a scripted provider. The default
//! backend scrapes the DuckDuckGo HTML endpoint (no API key required).

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// DuckDuckGo HTML endpoint
pub const DUCKDUCKGO_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// Default DuckDuckGo region code (no region)
pub const DEFAULT_REGION: &str = "wt-wt";

/// Default number of results
pub const DEFAULT_MAX_RESULTS: usize = 8;

/// Upper bound on results per query
pub const MAX_RESULTS_CAP: usize = 15;

/// Default HTTP timeout for a search request
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

/// User-Agent header to avoid bot blocking
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A single search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result title
    pub title: String,
    /// Destination URL
    pub url: String,
    /// Text snippet
    pub snippet: String,
}

/// A web search backend
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name, used in logs
    fn name(&self) -> &str;

    /// Run a query and return at most `max_results` hits
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

/// DuckDuckGo backend configuration
#[derive(Debug, Clone)]
pub struct DuckDuckGoConfig {
    /// HTML endpoint URL
    pub endpoint: String,
    /// Region code sent as `kl`
    pub region: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for DuckDuckGoConfig {
    fn default() -> Self {
        Self {
            endpoint: DUCKDUCKGO_HTML_ENDPOINT.to_string(),
            region: DEFAULT_REGION.to_string(),
            timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }
}

impl DuckDuckGoConfig {
    /// Set the endpoint URL
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the region code
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// DuckDuckGo HTML scraper.
///
/// Queries are sent as a form POST; GET requests with non-ASCII queries
/// tend to trigger the CAPTCHA page.
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    config: DuckDuckGoConfig,
    parser: ResultParser,
}

impl DuckDuckGoSearch {
    /// Create a new DuckDuckGo backend
    pub fn new(config: DuckDuckGoConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            parser: ResultParser::new()?,
        })
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &DuckDuckGoConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    #[instrument(skip(self), fields(region = %self.config.region))]
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        debug!("Fetching DuckDuckGo search results");

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Referer", "https://html.duckduckgo.com/")
            .form(&[("q", query), ("kl", self.config.region.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    Error::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!("search endpoint returned {status}")));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        debug!(html_len = html.len(), "DuckDuckGo response received");

        if html.contains("anomaly-modal") {
            warn!("DuckDuckGo returned CAPTCHA page");
            return Err(Error::Network(
                "DuckDuckGo CAPTCHA triggered; search temporarily blocked".to_string(),
            ));
        }

        Ok(self.parser.parse(&html, max_results))
    }
}

/// Render hits as the plain-text blob handed to the model
#[must_use]
pub fn format_hits(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No results found for '{query}'.");
    }

    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. {}\n   URL: {}\n   {}",
                i + 1,
                hit.title,
                hit.url,
                hit.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Compiled patterns for the DuckDuckGo result markup.
///
/// Title:   `<a class="result__a" href="...">TITLE</a>`
/// Snippet: `<a class="result__snippet">SNIPPET</a>`
struct ResultParser {
    title_re: Regex,
    snippet_re: Regex,
    tag_re: Regex,
}

impl ResultParser {
    fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| Error::Execution(format!("invalid pattern: {e}")))
        };
        Ok(Self {
            title_re: compile(r#"<a[^>]+class="result__a"[^>]+href="([^"]*)"[^>]*>(.*?)</a>"#)?,
            snippet_re: compile(r#"<a[^>]+class="result__snippet"[^>]*>(.*?)</a>"#)?,
            tag_re: compile(r"<[^>]+>")?,
        })
    }

    fn parse(&self, html: &str, max_results: usize) -> Vec<SearchHit> {
        let titles: Vec<(String, String)> = self
            .title_re
            .captures_iter(html)
            .map(|cap| {
                let url = extract_real_url(cap.get(1).map_or("", |m| m.as_str()));
                let title = self.strip_tags(cap.get(2).map_or("", |m| m.as_str()));
                (url, title)
            })
            .collect();

        let snippets: Vec<String> = self
            .snippet_re
            .captures_iter(html)
            .map(|cap| self.strip_tags(cap.get(1).map_or("", |m| m.as_str())))
            .collect();

        titles
            .into_iter()
            .enumerate()
            .map(|(i, (url, title))| SearchHit {
                title,
                url,
                snippet: snippets.get(i).cloned().unwrap_or_default(),
            })
            .filter(|hit| !hit.url.is_empty() && !hit.title.is_empty())
            .take(max_results)
            .collect()
    }

    /// Remove HTML tags and decode common entities
    fn strip_tags(&self, s: &str) -> String {
        self.tag_re
            .replace_all(s, "")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#x27;", "'")
            .replace("&nbsp;", " ")
            .trim()
            .to_string()
    }
}

/// DuckDuckGo wraps URLs in a redirect: `//duckduckgo.com/l/?uddg=REAL_URL&...`
fn extract_real_url(raw: &str) -> String {
    if let Some(pos) = raw.find("uddg=") {
        let rest = &raw[pos + 5..];
        let end = rest.find('&').unwrap_or(rest.len());
        urlencoding::decode(&rest[..end])
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| rest[..end].to_string())
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <div class="result">
            <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fai&rut=abc">AI <b>trends</b> 2026</a>
            <a class="result__snippet" href="x">Agents &amp; copilots dominate.</a>
        </div>
        <div class="result">
            <a rel="nofollow" class="result__a" href="https://direct.example.org">Direct hit</a>
            <a class="result__snippet" href="y">Second snippet</a>
        </div>
    "#;

    #[test]
    fn test_extract_real_url() {
        let raw = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=abc";
        assert_eq!(extract_real_url(raw), "https://example.com");
        assert_eq!(extract_real_url("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_parse_sample_html() {
        let parser = ResultParser::new().unwrap();
        let hits = parser.parse(SAMPLE, 5);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "AI trends 2026");
        assert_eq!(hits[0].url, "https://example.com/ai");
        assert_eq!(hits[0].snippet, "Agents & copilots dominate.");
        assert_eq!(hits[1].url, "https://direct.example.org");
    }

    #[test]
    fn test_parse_respects_max_results() {
        let parser = ResultParser::new().unwrap();
        assert_eq!(parser.parse(SAMPLE, 1).len(), 1);
        assert!(parser.parse("", 5).is_empty());
    }

    #[test]
    fn test_format_hits() {
        let hits = vec![SearchHit {
            title: "Title".to_string(),
            url: "https://a.example".to_string(),
            snippet: "Snippet".to_string(),
        }];
        assert_eq!(
            format_hits("q", &hits),
            "1. Title\n   URL: https://a.example\n   Snippet"
        );
        assert_eq!(format_hits("q", &[]), "No results found for 'q'.");
    }

    #[test]
    fn test_config_builder() {
        let config = DuckDuckGoConfig::default()
            .with_endpoint("http://127.0.0.1:9/html/")
            .with_region("us-en")
            .with_timeout(Duration::from_secs(3));

        assert_eq!(config.endpoint, "http://127.0.0.1:9/html/");
        assert_eq!(config.region, "us-en");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(DuckDuckGoConfig::default().region, DEFAULT_REGION);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_error() {
        let search = DuckDuckGoSearch::new(
            DuckDuckGoConfig::default()
                .with_endpoint("http://127.0.0.1:9/html/")
                .with_timeout(Duration::from_secs(2)),
        )
        .unwrap();

        assert!(search.search("AI trends", 3).await.is_err());
    }
}
