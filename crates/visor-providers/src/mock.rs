//! Mock gateway for testing.
//!
//! Returns scripted assistant messages in order and records every
//! request so tests can assert on what was sent.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::{AssistantMessage, ChatGateway, GatewayError, ToolCall, ToolSchema, Turn};

static TOOL_CALL_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a unique tool-call id for scripted replies
pub fn next_call_id() -> String {
    format!("call_{}", TOOL_CALL_COUNTER.fetch_add(1, Ordering::SeqCst))
}

#[derive(Default)]
pub struct MockGateway {
    replies: Mutex<VecDeque<AssistantMessage>>,
    requests: Mutex<Vec<Vec<Turn>>>,
    calls: AtomicUsize,
    /// When set, this reply is returned forever once the scripted ones run out
    repeat: Mutex<Option<AssistantMessage>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a plain text reply
    pub fn with_text(self, content: &str) -> Self {
        self.with_reply(AssistantMessage::text(content))
    }

    /// Queue a reply with a single tool call (and no text)
    pub fn with_tool_call(self, tool: &str, arguments: &str) -> Self {
        self.with_reply(AssistantMessage {
            content: None,
            tool_calls: vec![ToolCall::new(next_call_id(), tool, arguments)],
        })
    }

    pub fn with_reply(self, reply: AssistantMessage) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// Return `reply` for every request once the queue is drained
    pub fn repeating(self, reply: AssistantMessage) -> Self {
        *self.repeat.lock().unwrap() = Some(reply);
        self
    }

    /// Number of completed requests
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Turn sequences of every request, in order
    pub fn requests(&self) -> Vec<Vec<Turn>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatGateway for MockGateway {
    async fn complete(
        &self,
        turns: &[Turn],
        _tools: &[ToolSchema],
    ) -> Result<AssistantMessage, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(turns.to_vec());

        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            return Ok(reply);
        }
        if let Some(reply) = self.repeat.lock().unwrap().clone() {
            return Ok(reply);
        }
        Err(GatewayError::Api(
            "MockGateway has no scripted reply left".to_string(),
        ))
    }

    fn model(&self) -> &str {
        "mock"
    }
}

// Lets a test keep a handle for assertions after handing the gateway
// to an agent that takes ownership.
#[async_trait::async_trait]
impl ChatGateway for std::sync::Arc<MockGateway> {
    async fn complete(
        &self,
        turns: &[Turn],
        tools: &[ToolSchema],
    ) -> Result<AssistantMessage, GatewayError> {
        self.as_ref().complete(turns, tools).await
    }

    fn model(&self) -> &str {
        "mock"
    }
}
