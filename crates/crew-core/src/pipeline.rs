//! Research pipeline - the research → write → code crew
//!
//! Agents and tasks are rebuilt for every run; only the LLM client and the
//! search backend are shared.

use crate::agent::{Agent, AgentSettings};
use crate::crew::{Crew, CrewOutput};
use crate::error::{Error, Result};
use crate::executor::AgentExecutor;
use crate::task::{Task, TaskId};
use crew_llm::LlmProvider;
use crew_tools::{register_builtins, BuiltinsConfig, RunnerConfig, SearchProvider, ToolRegistry};
use std::sync::Arc;
use tracing::{info, instrument};

/// Id of the research task
pub const RESEARCH_TASK: &str = "research";
/// Id of the write task
pub const WRITE_TASK: &str = "write";
/// Id of the code task
pub const CODE_TASK: &str = "code";

/// Reject empty or whitespace-only goals; return the trimmed goal
pub fn validate_goal(goal: &str) -> Result<&str> {
    let goal = goal.trim();
    if goal.is_empty() {
        return Err(Error::EmptyGoal);
    }
    Ok(goal)
}

/// Builds the three-agent research crew
#[derive(Clone)]
pub struct ResearchCrewBuilder {
    llm: Arc<dyn LlmProvider>,
    builtins: BuiltinsConfig,
    settings: AgentSettings,
    runner_config: RunnerConfig,
}

impl std::fmt::Debug for ResearchCrewBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchCrewBuilder")
            .field("llm", &self.llm.name())
            .field("builtins", &self.builtins)
            .field("settings", &self.settings)
            .field("runner_config", &self.runner_config)
            .finish()
    }
}

impl ResearchCrewBuilder {
    /// Create a builder using `llm` for every agent
    #[must_use]
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            llm,
            builtins: BuiltinsConfig::default(),
            settings: AgentSettings::default(),
            runner_config: RunnerConfig::default(),
        }
    }

    /// Give the Researcher a search backend
    #[must_use]
    pub fn with_search(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.builtins = self.builtins.with_search(provider);
        self
    }

    /// Set hits returned per search
    #[must_use]
    pub fn with_search_max_results(mut self, max_results: usize) -> Self {
        self.builtins = self.builtins.with_search_max_results(max_results);
        self
    }

    /// Agent settings shared by all three agents
    #[must_use]
    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Tool runner settings
    #[must_use]
    pub fn with_runner_config(mut self, runner_config: RunnerConfig) -> Self {
        self.runner_config = runner_config;
        self
    }

    fn agent(&self, role: &str, goal: &str, backstory: &str) -> Agent {
        Agent::new(role, goal, backstory, Arc::clone(&self.llm)).with_settings(self.settings.clone())
    }

    fn researcher(&self) -> Agent {
        let mut tools = ToolRegistry::new();
        register_builtins(&mut tools, &self.builtins);
        self.agent(
            "Researcher",
            "Research AI trends",
            "Expert analyst — find 10-15 real 2026 signals/quotes with sources",
        )
        .with_tools(tools)
    }

    fn writer(&self) -> Agent {
        self.agent(
            "Writer",
            "Draft LinkedIn posts",
            "Copywriter — output ONLY clean posts",
        )
    }

    fn coder(&self) -> Agent {
        self.agent(
            "Coder",
            "Write code",
            "Python engineer — embed market signals in comments",
        )
    }

    /// Build the crew for `goal`
    pub fn build(&self, goal: &str) -> Result<Crew> {
        let goal = validate_goal(goal)?;

        let researcher = Arc::new(self.researcher());
        let writer = Arc::new(self.writer());
        let coder = Arc::new(self.coder());

        let research = Task::new(
            RESEARCH_TASK,
            format!("Research: {goal}\nFind 10-15 real 2026 market signals/quotes with sources"),
            "Signals list with sources",
            researcher,
        )
        .with_name("Research");

        let write = Task::new(WRITE_TASK, "Write 2 LinkedIn posts", "Two clean posts", writer)
            .with_name("Write")
            .with_context([TaskId::from(RESEARCH_TASK)]);

        let code = Task::new(
            CODE_TASK,
            format!(
                "Write simple code example for: {goal}\nEmbed 5-8 market signals from research in comments"
            ),
            "Short Python code with signals",
            coder,
        )
        .with_name("Code")
        .with_context([TaskId::from(RESEARCH_TASK)]);

        Ok(Crew::new(vec![research, write, code])
            .with_executor(AgentExecutor::new(self.runner_config.clone())))
    }

    /// Build and run the crew for `goal`
    #[instrument(skip(self))]
    pub async fn run(&self, goal: &str) -> Result<CrewOutput> {
        let crew = self.build(goal)?;
        info!("Research crew started");
        crew.kickoff().await
    }
}
