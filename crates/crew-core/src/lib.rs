//! Crew Core - Sequential multi-agent runner
//!
//! This crate provides the orchestration logic for Research Crew:
//! - Agent: role descriptors bound to an LLM client and a tool registry
//! - Task: units of work with explicit context dependencies
//! - Executor: drives one agent through a task, including the tool loop
//! - Crew: validates the task graph and runs it in declaration order
//! - Pipeline: the fixed research → write → code crew

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agent;
pub mod crew;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod prompt;
pub mod task;

pub use agent::{Agent, AgentSettings};
pub use crew::{Crew, CrewOutput};
pub use error::{format_error_for_chat, format_error_for_cli, Error, Result, UserFriendlyError};
pub use executor::{AgentExecutor, AgentOutcome, ToolCallRecord};
pub use pipeline::{validate_goal, ResearchCrewBuilder, CODE_TASK, RESEARCH_TASK, WRITE_TASK};
pub use task::{Task, TaskId, TaskOutput};
