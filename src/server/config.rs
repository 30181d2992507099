//! Server configuration types
//!
//! Contains all configuration structures for the Research Crew server.

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub crew: CrewConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

/// LLM provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

// Keep the key out of logs and `check` output.
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field(
                "api_key",
                &self.api_key.as_deref().map(crew_llm::util::mask_api_key),
            )
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_provider() -> String {
    "groq".to_string()
}

fn default_base_url() -> String {
    crew_llm::groq::GROQ_API_BASE.to_string()
}

fn default_model() -> String {
    crew_llm::groq::DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_llm_timeout() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// Web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_search_endpoint() -> String {
    crew_tools::search::DUCKDUCKGO_HTML_ENDPOINT.to_string()
}

fn default_region() -> String {
    crew_tools::search::DEFAULT_REGION.to_string()
}

fn default_max_results() -> usize {
    crew_tools::search::DEFAULT_MAX_RESULTS
}

fn default_search_timeout() -> u64 {
    15
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_search_endpoint(),
            region: default_region(),
            max_results: default_max_results(),
            timeout_secs: default_search_timeout(),
        }
    }
}

/// Crew execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,
    #[serde(default = "default_max_stored_runs")]
    pub max_stored_runs: usize,
}

fn default_max_iterations() -> usize {
    5
}

fn default_tool_timeout() -> u64 {
    30
}

fn default_max_stored_runs() -> usize {
    50
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tool_timeout_secs: default_tool_timeout(),
            max_stored_runs: default_max_stored_runs(),
        }
    }
}

/// Download artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_filename")]
    pub filename: String,
}

fn default_filename() -> String {
    "research_crew_output.txt".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filename: default_filename(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "research_crew=info,crew_core=info,tower_http=info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AppConfig {
    /// Resolve the Groq key: `llm.api_key` first, then `GROQ_API_KEY`.
    pub fn resolve_api_key(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<String, crew_core::Error> {
        let key = self
            .llm
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env("GROQ_API_KEY"))
            .map(|k| k.trim().to_string())
            .unwrap_or_default();

        match crew_llm::util::validate_api_key(&key, "Groq") {
            None => Ok(key),
            Some(reason) if key.is_empty() => {
                tracing::debug!(%reason, "No API key configured");
                Err(crew_core::Error::ApiKeyMissing {
                    provider: "Groq".to_string(),
                })
            }
            Some(reason) => Err(crew_core::Error::Configuration(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert!((config.llm.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.output.filename, "research_crew_output.txt");
        assert_eq!(config.crew.tool_timeout_secs, 30);
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let config = AppConfig::default();
        assert!(matches!(
            config.resolve_api_key(no_env),
            Err(crew_core::Error::ApiKeyMissing { .. })
        ));
    }

    #[test]
    fn test_key_from_env() {
        let config = AppConfig::default();
        let key = config
            .resolve_api_key(|name| (name == "GROQ_API_KEY").then(|| " gsk_from_env_123 ".to_string()))
            .unwrap();
        assert_eq!(key, "gsk_from_env_123");
    }

    #[test]
    fn test_config_key_wins() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("gsk_from_config_1".to_string());
        let key = config
            .resolve_api_key(|_| Some("gsk_from_env_123".to_string()))
            .unwrap();
        assert_eq!(key, "gsk_from_config_1");
    }

    #[test]
    fn test_short_key_rejected() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("abc".to_string());
        assert!(matches!(
            config.resolve_api_key(no_env),
            Err(crew_core::Error::Configuration(_))
        ));
    }

    #[test]
    fn test_debug_masks_key() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("gsk_1234567890abcdef".to_string());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("1234567890"));
        assert!(debug.contains("gsk_...cdef"));
    }
}
