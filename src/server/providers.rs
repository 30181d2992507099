//! Provider construction
//!
//! Turns the loaded configuration into the shared LLM client, the search
//! backend and the crew builder. No network calls happen here.

use super::config::AppConfig;
use anyhow::{bail, Context, Result};
use crew_core::{AgentSettings, ResearchCrewBuilder};
use crew_llm::{GroqConfig, GroqProvider, LlmProvider};
use crew_tools::{DuckDuckGoConfig, DuckDuckGoSearch, RunnerConfig, SearchProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Build the LLM client for `api_key`
pub fn resolve_llm_provider(config: &AppConfig, api_key: String) -> Result<Arc<dyn LlmProvider>> {
    if config.llm.provider != "groq" {
        bail!("Unsupported LLM provider '{}'", config.llm.provider);
    }

    let groq_config = GroqConfig::new(api_key)
        .with_base_url(&config.llm.base_url)
        .with_model(&config.llm.model)
        .with_timeout(Duration::from_secs(config.llm.timeout_secs));
    let provider = GroqProvider::new(groq_config).context("Failed to create Groq provider")?;

    info!(provider = "groq", model = %config.llm.model, "LLM provider ready");
    Ok(Arc::new(provider))
}

/// Build the search backend, if enabled
pub fn resolve_search_provider(config: &AppConfig) -> Result<Option<Arc<dyn SearchProvider>>> {
    if !config.search.enabled {
        info!("Web search disabled");
        return Ok(None);
    }

    let search = DuckDuckGoSearch::new(
        DuckDuckGoConfig::default()
            .with_endpoint(&config.search.endpoint)
            .with_region(&config.search.region)
            .with_timeout(Duration::from_secs(config.search.timeout_secs)),
    )
    .context("Failed to create search provider")?;
    Ok(Some(Arc::new(search)))
}

/// Build the crew builder shared by the CLI and the web server
pub fn build_crew_builder(
    config: &AppConfig,
    llm: Arc<dyn LlmProvider>,
    search: Option<Arc<dyn SearchProvider>>,
) -> ResearchCrewBuilder {
    let mut settings = AgentSettings::default()
        .with_model(&config.llm.model)
        .with_temperature(config.llm.temperature)
        .with_max_iterations(config.crew.max_iterations);
    if let Some(max_tokens) = config.llm.max_tokens {
        settings = settings.with_max_tokens(max_tokens);
    }

    let builder = ResearchCrewBuilder::new(llm)
        .with_settings(settings)
        .with_search_max_results(config.search.max_results)
        .with_runner_config(RunnerConfig::new(Duration::from_secs(
            config.crew.tool_timeout_secs,
        )));

    match search {
        Some(search) => builder.with_search(search),
        None => builder,
    }
}

/// Resolve the key and build everything a run needs
pub fn build_from_config(config: &AppConfig) -> Result<ResearchCrewBuilder> {
    let api_key = config
        .resolve_api_key(|name| std::env::var(name).ok())
        .map_err(|e| anyhow::anyhow!(crew_core::format_error_for_cli(&e)))?;
    let llm = resolve_llm_provider(config, api_key)?;
    let search = resolve_search_provider(config)?;
    Ok(build_crew_builder(config, llm, search))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_llm_provider() {
        let config = AppConfig::default();
        let llm = resolve_llm_provider(&config, "gsk_test_key_123456".to_string()).unwrap();
        assert_eq!(llm.name(), "groq");
    }

    #[test]
    fn test_unknown_provider() {
        let mut config = AppConfig::default();
        config.llm.provider = "openai".to_string();
        assert!(resolve_llm_provider(&config, "gsk_test_key_123456".to_string()).is_err());
    }

    #[test]
    fn test_search_can_be_disabled() {
        let mut config = AppConfig::default();
        config.search.enabled = false;
        assert!(resolve_search_provider(&config).unwrap().is_none());

        config.search.enabled = true;
        assert!(resolve_search_provider(&config).unwrap().is_some());
    }

    #[test]
    fn test_builder_builds_crew() {
        let config = AppConfig::default();
        let llm = Arc::new(crew_llm::MockProvider::new());
        let builder = build_crew_builder(&config, llm, None);
        let crew = builder.build("AI trends 2026").unwrap();
        assert_eq!(crew.tasks().len(), 3);
        assert_eq!(crew.tasks()[0].agent.settings().max_iterations, 5);
    }
}
