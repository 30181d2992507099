//! Crew LLM - LLM Provider Abstraction
//!
//! This crate provides LLM integration for Research Crew:
//! - Provider: the `LlmProvider` trait every backend implements
//! - Groq: OpenAI-compatible chat completions (Llama 3.3 70B by default)
//! - Mock: scripted provider used by tests across the workspace

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod groq;
pub mod message;
pub mod mock;
pub mod provider;
pub mod tools;
pub mod util;

pub use completion::{
    CompletionRequest, CompletionResponse, TokenUsage, ToolCompletionRequest,
    ToolCompletionResponse,
};
pub use error::{Error, Result};
pub use groq::{GroqConfig, GroqProvider};
pub use message::{Message, MessageRole};
pub use mock::{MockProvider, MockReply};
pub use provider::LlmProvider;
pub use tools::{ToolCall, ToolChoice, ToolDefinition};
