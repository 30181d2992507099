//! Prompt construction for agents

use crate::agent::Agent;
use crate::task::Task;

/// Separator placed between predecessor outputs in the context section
pub const CONTEXT_SEPARATOR: &str = "\n\n----------\n\n";

/// Sent after the tool budget is exhausted
pub const FINAL_ANSWER_PROMPT: &str = "You have used all available tool calls. \
    Give your best complete final answer now, based on the information gathered so far.";

/// System prompt describing the agent's persona
#[must_use]
pub fn system_prompt(agent: &Agent) -> String {
    format!(
        "You are {}. {}\nYour personal goal is: {}",
        agent.role, agent.backstory, agent.goal
    )
}

/// User prompt for one task, with resolved predecessor outputs
#[must_use]
pub fn task_prompt(task: &Task, context: &[&str]) -> String {
    let mut prompt = format!(
        "Current task: {}\n\nThis is the expected criteria for your final answer: {}\n\
         You MUST return the actual complete content as the final answer, not a summary.",
        task.description, task.expected_output
    );

    if !context.is_empty() {
        prompt.push_str("\n\nThis is the context you're working with:\n");
        prompt.push_str(&context.join(CONTEXT_SEPARATOR));
    }

    prompt
}
