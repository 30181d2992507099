//! Task - a unit of work assigned to one agent

use crate::agent::Agent;
use crate::executor::ToolCallRecord;
use crew_llm::TokenUsage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of a task within a crew
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Create a task id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A task descriptor.
///
/// `context` lists the predecessor tasks whose outputs are fed into this
/// task's prompt, in the order given.
#[derive(Debug, Clone)]
pub struct Task {
    /// Unique id within the crew
    pub id: TaskId,
    /// Display name
    pub name: String,
    /// What the agent must do
    pub description: String,
    /// Criterion for the final answer
    pub expected_output: String,
    /// Assigned agent
    pub agent: Arc<Agent>,
    /// Context dependencies
    pub context: Vec<TaskId>,
}

impl Task {
    /// Create a task with no context
    #[must_use]
    pub fn new(
        id: impl Into<TaskId>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: Arc<Agent>,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
            context: Vec::new(),
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Declare context dependencies
    #[must_use]
    pub fn with_context(mut self, context: impl IntoIterator<Item = TaskId>) -> Self {
        self.context = context.into_iter().collect();
        self
    }
}

/// Output of one executed task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Task id
    pub task_id: TaskId,
    /// Task display name
    pub name: String,
    /// Role of the agent that ran it
    pub agent_role: String,
    /// Task description as sent to the agent
    pub description: String,
    /// Final answer text
    pub raw: String,
    /// Tool calls made while producing the answer
    pub tool_calls: Vec<ToolCallRecord>,
    /// Model rounds used
    pub iterations: usize,
    /// Token usage across all rounds
    pub usage: TokenUsage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_llm::MockProvider;

    #[test]
    fn test_task_builder() {
        let agent = Arc::new(Agent::new("Writer", "g", "b", Arc::new(MockProvider::new())));
        let task = Task::new("write", "Write 2 LinkedIn posts", "Two clean posts", agent)
            .with_name("Write")
            .with_context([TaskId::from("research")]);

        assert_eq!(task.id.as_str(), "write");
        assert_eq!(task.name, "Write");
        assert_eq!(task.context, vec![TaskId::new("research")]);
    }

    #[test]
    fn test_task_id_serializes_as_string() {
        let json = serde_json::to_string(&TaskId::new("code")).unwrap();
        assert_eq!(json, "\"code\"");
        assert_eq!(TaskId::new("code").to_string(), "code");
    }
}
