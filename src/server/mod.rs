//! Server module for Research Crew
//!
//! # Module Structure
//!
//! - `config`: Configuration structures for all server components
//! - `loader`: Configuration loading from files and environment
//! - `providers`: LLM, search and crew builder construction
//! - `init`: Router construction and the HTTP run loop

pub mod config;
mod init;
mod loader;
mod providers;

// Re-export public API
pub use init::run;
pub use loader::load_config;
pub use providers::{build_crew_builder, resolve_llm_provider, resolve_search_provider};
