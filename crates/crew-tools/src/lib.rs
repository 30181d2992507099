//! Crew Tools - Tool Registry and Execution Engine
//!
//! This crate provides the tool system for Research Crew:
//! - Registry: Tool registration and lookup per agent
//! - Runner: Tool execution with timeouts
//! - Search: Search provider abstraction with a DuckDuckGo backend
//! - Builtins: The `web_search` tool the Researcher agent calls

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builtins;
pub mod error;
pub mod registry;
pub mod runner;
pub mod search;

pub use builtins::{register_builtins, BuiltinsConfig, WebSearchTool, WEB_SEARCH_TOOL_NAME};
pub use error::{Error, Result};
pub use registry::{Tool, ToolCategory, ToolDefinition, ToolRegistry, ToolResult};
pub use runner::{RunnerConfig, ToolRunner};
pub use search::{format_hits, DuckDuckGoConfig, DuckDuckGoSearch, SearchHit, SearchProvider};
