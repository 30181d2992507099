//! Mock LLM Provider for testing
//!
//! Replies are scripted in order; every request is recorded so tests can
//! assert on the prompts an agent actually sent.

use crate::completion::{
    CompletionRequest, CompletionResponse, ToolCompletionRequest, ToolCompletionResponse,
};
use crate::error::{Error, Result};
use crate::provider::LlmProvider;
use crate::tools::ToolCall;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const MOCK_MODEL: &str = "mock-model";

/// A scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Plain text answer
    Text(String),
    /// Ask for tool calls
    ToolCalls(Vec<ToolCall>),
    /// Fail the call with an API error
    Fail(String),
}

impl MockReply {
    /// Plain text reply
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Single tool call reply
    pub fn tool_call(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self::ToolCalls(vec![ToolCall {
            id: id.into(),
            name: name.into(),
            arguments: arguments.to_string(),
        }])
    }
}

/// A request seen by the mock
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The completion request
    pub request: CompletionRequest,
    /// Names of the tools offered with the request (empty for `complete`)
    pub tool_names: Vec<String>,
}

/// A mock LLM provider that returns queued replies or a default one.
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<MockRequest>>>,
    default_reply: String,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a new mock provider.
    #[must_use]
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            default_reply: "mock response".to_string(),
        }
    }

    /// Create a provider with a scripted sequence of replies.
    #[must_use]
    pub fn with_replies(replies: impl IntoIterator<Item = MockReply>) -> Self {
        let provider = Self::new();
        for reply in replies {
            provider.push_reply(reply);
        }
        provider
    }

    /// Set the text returned once the queue is drained.
    #[must_use]
    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = reply.into();
        self
    }

    /// Add a reply to the queue.
    pub fn push_reply(&self, reply: MockReply) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }

    /// All requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn record(&self, request: CompletionRequest, tool_names: Vec<String>) {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(MockRequest {
                request,
                tool_names,
            });
    }

    fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| MockReply::Text(self.default_reply.clone()))
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn supports_tools(&self) -> bool {
        true
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.record(request, Vec::new());
        match self.next_reply() {
            MockReply::Text(content) => Ok(CompletionResponse {
                content,
                usage: None,
                finish_reason: Some("stop".to_string()),
                model: MOCK_MODEL.to_string(),
            }),
            MockReply::ToolCalls(_) => Err(Error::InvalidResponse(
                "tool calls returned for a request without tools".to_string(),
            )),
            MockReply::Fail(msg) => Err(Error::Api(msg)),
        }
    }

    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse> {
        let tool_names = request.tools.iter().map(|t| t.name.clone()).collect();
        self.record(request.request, tool_names);
        match self.next_reply() {
            MockReply::Text(content) => Ok(ToolCompletionResponse {
                content: Some(content),
                tool_calls: vec![],
                usage: None,
                finish_reason: Some("stop".to_string()),
                model: MOCK_MODEL.to_string(),
            }),
            MockReply::ToolCalls(tool_calls) => Ok(ToolCompletionResponse {
                content: None,
                tool_calls,
                usage: None,
                finish_reason: Some("tool_calls".to_string()),
                model: MOCK_MODEL.to_string(),
            }),
            MockReply::Fail(msg) => Err(Error::Api(msg)),
        }
    }
}
