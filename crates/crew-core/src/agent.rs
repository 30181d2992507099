//! Agent - a role bound to a model client and a tool set

use crew_llm::{CompletionRequest, LlmProvider, Message};
use crew_tools::ToolRegistry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Sampling and loop settings for an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Model identifier sent to the provider
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate per call
    pub max_tokens: Option<u32>,
    /// Maximum tool-calling rounds before a final answer is forced
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: crew_llm::groq::DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            max_tokens: None,
            max_iterations: 5,
        }
    }
}

impl AgentSettings {
    /// Set the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set max tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the tool-loop budget
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// A named role that executes tasks.
///
/// Agents are immutable once built; the LLM client behind them is shared
/// and read-only.
#[derive(Clone)]
pub struct Agent {
    /// Role name, e.g. "Researcher"
    pub role: String,
    /// What the agent is trying to achieve
    pub goal: String,
    /// Persona text for the system prompt
    pub backstory: String,
    tools: Arc<ToolRegistry>,
    llm: Arc<dyn LlmProvider>,
    settings: AgentSettings,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("role", &self.role)
            .field("goal", &self.goal)
            .field("backstory", &self.backstory)
            .field("tools", &self.tools.list_names())
            .field("llm", &self.llm.name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl Agent {
    /// Create an agent without tools
    #[must_use]
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            tools: Arc::new(ToolRegistry::new()),
            llm,
            settings: AgentSettings::default(),
        }
    }

    /// Give the agent a tool registry
    #[must_use]
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Arc::new(tools);
        self
    }

    /// Replace the settings
    #[must_use]
    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The agent's tools
    #[must_use]
    pub fn tools(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.tools)
    }

    /// Whether the agent will run a tool loop
    #[must_use]
    pub fn uses_tools(&self) -> bool {
        !self.tools.is_empty() && self.llm.supports_tools()
    }

    /// The model client
    #[must_use]
    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    /// The agent settings
    #[must_use]
    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Build a completion request carrying this agent's sampling settings
    #[must_use]
    pub fn request(&self, messages: Vec<Message>) -> CompletionRequest {
        let request = CompletionRequest::new(&self.settings.model)
            .with_messages(messages)
            .with_temperature(self.settings.temperature);
        match self.settings.max_tokens {
            Some(max_tokens) => request.with_max_tokens(max_tokens),
            None => request,
        }
    }
}
