//! Error types for crew-core
//!
//! This module provides error types and user-friendly error formatting.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// API key missing or empty
    #[error("API key error: {provider}")]
    ApiKeyMissing {
        /// Provider name
        provider: String,
    },

    /// Goal was empty or whitespace
    #[error("goal must not be empty")]
    EmptyGoal,

    /// Task graph is malformed
    #[error("invalid crew: {0}")]
    InvalidCrew(String),

    /// Agent produced no final answer
    #[error("agent '{role}' returned an empty answer for task '{task}'")]
    EmptyOutput {
        /// Agent role
        role: String,
        /// Task id
        task: String,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// LLM provider error
    #[error("llm error: {0}")]
    Llm(#[from] crew_llm::Error),
}

impl Error {
    /// Whether the model provider failed the run
    #[must_use]
    pub fn is_model_failure(&self) -> bool {
        matches!(self, Error::Llm(_) | Error::EmptyOutput { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for user-friendly error messages
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to fix the error
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self {
            Error::ApiKeyMissing { provider } => {
                format!("🔑 {} API key is not configured.", provider)
            }
            Error::EmptyGoal => "⚠️ Enter a goal".to_string(),
            Error::InvalidCrew(msg) => format!("📋 Invalid crew: {}", msg),
            Error::EmptyOutput { role, .. } => {
                format!("🤖 The {} agent returned an empty answer.", role)
            }
            Error::Configuration(msg) => format!("⚙️ Configuration error: {}", msg),
            Error::Llm(crew_llm::Error::RateLimit) => {
                "⏳ Rate limit exceeded. Please try again later.".to_string()
            }
            Error::Llm(e) if e.is_auth() => {
                "🔑 The model provider rejected the API key.".to_string()
            }
            Error::Llm(e) => format!("🤖 LLM error: {}", e),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Error::ApiKeyMissing { provider } => Some(format!(
                "💡 Set the {}_API_KEY environment variable or llm.api_key in config/local.toml.",
                provider.to_uppercase().replace(' ', "_")
            )),
            Error::EmptyGoal => Some("💡 Describe a topic, e.g. \"AI trends 2026\".".to_string()),
            Error::Llm(crew_llm::Error::RateLimit) => {
                Some("💡 Wait a minute before starting another run.".to_string())
            }
            Error::Llm(e) if e.is_auth() => {
                Some("💡 Check that GROQ_API_KEY holds a valid key.".to_string())
            }
            Error::Llm(_) | Error::EmptyOutput { .. } => {
                Some("💡 Check your internet connection and try again.".to_string())
            }
            Error::Configuration(_) => {
                Some("💡 Run `research-crew check` to inspect the effective settings.".to_string())
            }
            _ => None,
        }
    }
}

/// Format an error for display in the CLI
pub fn format_error_for_cli(error: &Error) -> String {
    let mut output = String::new();

    output.push_str(&error.user_message());
    output.push_str("\n\n");

    if let Some(suggestion) = error.suggestion() {
        output.push_str(&suggestion);
        output.push('\n');
    }

    output
}

/// Format an error for display in the web UI
pub fn format_error_for_chat(error: &Error) -> String {
    let mut output = error.user_message();

    if let Some(suggestion) = error.suggestion() {
        output.push_str("\n\n");
        output.push_str(&suggestion);
    }

    output
}
