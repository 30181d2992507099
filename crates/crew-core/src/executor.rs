//! Agent executor
//!
//! Runs one agent against one task prompt. Agents without tools get a
//! single completion; agents with tools go through a bounded tool loop in
//! which every tool result, failed or not, is fed back to the model.

use crate::agent::Agent;
use crate::error::Result;
use crate::prompt::{system_prompt, FINAL_ANSWER_PROMPT};
use crew_llm::{Message, TokenUsage, ToolCall, ToolChoice, ToolCompletionRequest};
use crew_tools::{RunnerConfig, ToolRunner};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Record of a single tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Tool name
    pub tool_name: String,
    /// Input arguments
    pub input: serde_json::Value,
    /// Text handed back to the model
    pub output: String,
    /// Whether it succeeded
    pub success: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// What an agent produced for one task
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// Final answer text, trimmed
    pub content: String,
    /// Tool calls made along the way
    pub tool_calls: Vec<ToolCallRecord>,
    /// Model rounds used
    pub iterations: usize,
    /// Accumulated token usage
    pub usage: TokenUsage,
}

/// Drives agents through tasks
#[derive(Debug, Clone, Default)]
pub struct AgentExecutor {
    runner_config: RunnerConfig,
}

impl AgentExecutor {
    /// Create an executor with the given tool runner settings
    #[must_use]
    pub fn new(runner_config: RunnerConfig) -> Self {
        Self { runner_config }
    }

    /// Run `agent` on `task_prompt` and return its final answer.
    ///
    /// Model failures are returned as errors; tool failures are not.
    #[instrument(skip(self, agent, task_prompt), fields(role = %agent.role))]
    pub async fn execute(&self, agent: &Agent, task_prompt: String) -> Result<AgentOutcome> {
        let messages = vec![Message::system(system_prompt(agent)), Message::user(task_prompt)];

        let outcome = if agent.uses_tools() {
            self.run_tool_loop(agent, messages).await?
        } else {
            let response = agent.llm().complete(agent.request(messages)).await?;
            AgentOutcome {
                content: response.content,
                tool_calls: Vec::new(),
                iterations: 1,
                usage: response.usage.unwrap_or_default(),
            }
        };

        info!(
            iterations = outcome.iterations,
            tool_calls = outcome.tool_calls.len(),
            answer_len = outcome.content.len(),
            "Agent finished"
        );

        Ok(AgentOutcome {
            content: outcome.content.trim().to_string(),
            ..outcome
        })
    }

    async fn run_tool_loop(&self, agent: &Agent, mut messages: Vec<Message>) -> Result<AgentOutcome> {
        let runner = ToolRunner::new(agent.tools(), self.runner_config.clone());
        let tools = runner.registry().to_llm_tools();
        let max_iterations = agent.settings().max_iterations;

        let mut usage = TokenUsage::default();
        let mut records = Vec::new();
        let mut iteration = 0;

        while iteration < max_iterations {
            iteration += 1;

            let request = ToolCompletionRequest::new(agent.request(messages.clone()), tools.clone())
                .with_tool_choice(ToolChoice::Auto);
            let response = agent.llm().complete_with_tools(request).await?;
            if let Some(u) = &response.usage {
                usage.accumulate(u);
            }

            if !response.has_tool_calls() {
                return Ok(AgentOutcome {
                    content: response.content.unwrap_or_default(),
                    tool_calls: records,
                    iterations: iteration,
                    usage,
                });
            }

            debug!(
                iteration,
                calls = response.tool_calls.len(),
                "Model requested tools"
            );
            messages.push(Message::assistant_with_tool_calls(
                response.content.clone().unwrap_or_default(),
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let record = Self::run_tool(&runner, call).await;
                messages.push(Message::tool_response_named(
                    &call.id,
                    &call.name,
                    record.output.clone(),
                ));
                records.push(record);
            }
        }

        warn!(
            iterations = iteration,
            "Max iterations reached, asking for final answer"
        );
        messages.push(Message::user(FINAL_ANSWER_PROMPT));
        let response = agent.llm().complete(agent.request(messages)).await?;
        if let Some(u) = &response.usage {
            usage.accumulate(u);
        }

        Ok(AgentOutcome {
            content: response.content,
            tool_calls: records,
            iterations: iteration + 1,
            usage,
        })
    }

    async fn run_tool(runner: &ToolRunner, call: &ToolCall) -> ToolCallRecord {
        // Malformed arguments fall back to an empty object; the tool rejects it.
        let input: serde_json::Value = serde_json::from_str(&call.arguments).unwrap_or_else(|e| {
            warn!(
                tool = %call.name,
                error = %e,
                arguments = %call.arguments,
                "Failed to parse tool arguments, using empty object"
            );
            serde_json::json!({})
        });

        let start = Instant::now();
        let (output, success) = match runner.execute(&call.name, input.clone()).await {
            Ok(result) => (result.to_model_text(), result.success),
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool call rejected");
                (format!("Error: {e}"), false)
            }
        };

        ToolCallRecord {
            tool_name: call.name.clone(),
            input,
            output,
            success,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}
