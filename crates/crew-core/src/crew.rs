//! Crew - sequential task-chain runner
//!
//! A crew is an ordered list of tasks whose context edges may only point
//! at earlier tasks. The graph is checked before any model call, then the
//! tasks run one at a time with predecessor outputs resolved by id.

use crate::error::{Error, Result};
use crate::executor::AgentExecutor;
use crate::prompt::task_prompt;
use crate::task::{Task, TaskId, TaskOutput};
use crew_llm::TokenUsage;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::time::Instant;
use tracing::{info, instrument};

/// Result of a crew run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewOutput {
    /// Output of the last declared task
    pub raw: String,
    /// Every task's output, in execution order
    pub tasks_output: Vec<TaskOutput>,
    /// Token usage across the run
    pub usage: TokenUsage,
    /// Wall-clock duration of the run
    pub duration_ms: u64,
}

impl CrewOutput {
    /// Look up one task's output
    #[must_use]
    pub fn task_output(&self, id: &str) -> Option<&TaskOutput> {
        self.tasks_output.iter().find(|o| o.task_id.as_str() == id)
    }
}

/// An ordered set of tasks
#[derive(Debug, Clone)]
pub struct Crew {
    tasks: Vec<Task>,
    executor: AgentExecutor,
}

impl Crew {
    /// Create a crew from tasks in declaration order
    #[must_use]
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            executor: AgentExecutor::default(),
        }
    }

    /// Use a custom executor
    #[must_use]
    pub fn with_executor(mut self, executor: AgentExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Tasks in declaration order
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Validate the task graph and return the execution order as indices.
    ///
    /// Ties are broken by declaration order, and because edges only point
    /// backwards the result is always `0..len`.
    pub fn plan(&self) -> Result<Vec<usize>> {
        if self.tasks.is_empty() {
            return Err(Error::InvalidCrew("crew has no tasks".to_string()));
        }

        let mut index: HashMap<&TaskId, usize> = HashMap::with_capacity(self.tasks.len());
        for (i, task) in self.tasks.iter().enumerate() {
            if index.insert(&task.id, i).is_some() {
                return Err(Error::InvalidCrew(format!("duplicate task id '{}'", task.id)));
            }
        }

        let mut in_degree = vec![0_usize; self.tasks.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.tasks.len()];
        for (i, task) in self.tasks.iter().enumerate() {
            for dep in &task.context {
                let j = *index.get(dep).ok_or_else(|| {
                    Error::InvalidCrew(format!(
                        "task '{}' depends on unknown task '{}'",
                        task.id, dep
                    ))
                })?;
                if j >= i {
                    return Err(Error::InvalidCrew(format!(
                        "task '{}' may only depend on earlier tasks, not '{}'",
                        task.id, dep
                    )));
                }
                in_degree[i] += 1;
                dependents[j].push(i);
            }
        }

        let mut ready: BTreeSet<usize> = (0..self.tasks.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.tasks.len());
        while let Some(i) = ready.pop_first() {
            order.push(i);
            for &k in &dependents[i] {
                in_degree[k] -= 1;
                if in_degree[k] == 0 {
                    ready.insert(k);
                }
            }
        }

        if order.len() != self.tasks.len() {
            return Err(Error::InvalidCrew("task graph contains a cycle".to_string()));
        }
        Ok(order)
    }

    /// Run every task and return the final task's output.
    #[instrument(skip(self), fields(tasks = self.tasks.len()))]
    pub async fn kickoff(&self) -> Result<CrewOutput> {
        let order = self.plan()?;
        let start = Instant::now();

        let mut outputs: HashMap<TaskId, TaskOutput> = HashMap::with_capacity(order.len());
        let mut executed = Vec::with_capacity(order.len());
        let mut usage = TokenUsage::default();

        for i in order {
            let task = &self.tasks[i];
            let context = task
                .context
                .iter()
                .map(|dep| {
                    outputs.get(dep).map(|o| o.raw.as_str()).ok_or_else(|| {
                        Error::InvalidCrew(format!("context '{}' not available for '{}'", dep, task.id))
                    })
                })
                .collect::<Result<Vec<&str>>>()?;

            info!(task = %task.id, role = %task.agent.role, context = context.len(), "Starting task");
            let prompt = task_prompt(task, &context);
            let outcome = self.executor.execute(&task.agent, prompt).await?;

            if outcome.content.is_empty() {
                return Err(Error::EmptyOutput {
                    role: task.agent.role.clone(),
                    task: task.id.to_string(),
                });
            }

            usage.accumulate(&outcome.usage);
            executed.push(task.id.clone());
            outputs.insert(
                task.id.clone(),
                TaskOutput {
                    task_id: task.id.clone(),
                    name: task.name.clone(),
                    agent_role: task.agent.role.clone(),
                    description: task.description.clone(),
                    raw: outcome.content,
                    tool_calls: outcome.tool_calls,
                    iterations: outcome.iterations,
                    usage: outcome.usage,
                },
            );
        }

        let tasks_output: Vec<TaskOutput> = executed
            .iter()
            .filter_map(|id| outputs.remove(id))
            .collect();
        let last_id = &self.tasks[self.tasks.len() - 1].id;
        let raw = tasks_output
            .iter()
            .find(|o| &o.task_id == last_id)
            .map(|o| o.raw.clone())
            .unwrap_or_default();

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(duration_ms, total_tokens = usage.total_tokens, "Crew finished");

        Ok(CrewOutput {
            raw,
            tasks_output,
            usage,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crew_llm::MockProvider;
    use std::sync::Arc;

    fn task(id: &str, context: &[&str]) -> Task {
        let agent = Arc::new(Agent::new("Writer", "g", "b", Arc::new(MockProvider::new())));
        Task::new(id, format!("do {id}"), "done", agent)
            .with_context(context.iter().map(|c| TaskId::from(*c)))
    }

    #[test]
    fn test_plan_is_declaration_order() {
        let crew = Crew::new(vec![
            task("research", &[]),
            task("write", &["research"]),
            task("code", &["research"]),
        ]);
        assert_eq!(crew.plan().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_plan_rejects_bad_graphs() {
        let empty = Crew::new(vec![]);
        assert!(matches!(empty.plan(), Err(Error::InvalidCrew(_))));

        let forward = Crew::new(vec![task("a", &["b"]), task("b", &[])]);
        assert!(matches!(forward.plan(), Err(Error::InvalidCrew(m)) if m.contains("earlier")));

        let self_edge = Crew::new(vec![task("a", &["a"])]);
        assert!(matches!(self_edge.plan(), Err(Error::InvalidCrew(_))));

        let unknown = Crew::new(vec![task("a", &["ghost"])]);
        assert!(matches!(unknown.plan(), Err(Error::InvalidCrew(m)) if m.contains("unknown")));

        let duplicate = Crew::new(vec![task("a", &[]), task("a", &[])]);
        assert!(matches!(duplicate.plan(), Err(Error::InvalidCrew(m)) if m.contains("duplicate")));
    }
}
