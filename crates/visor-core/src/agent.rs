//! The orchestration loop: call the model, dispatch the tool calls it
//! requests, feed results back, and stop on a plain-text reply or when
//! the iteration budget runs out.

use anyhow::Result;
use serde_json::json;
use tracing::{debug, info, warn};
use visor_config::AgentConfig;
use visor_providers::{ChatGateway, ToolCall, Turn};

use crate::history::Transcript;
use crate::prompts::{
    MAX_ITERATIONS_REPLY, SCREENSHOT_FOLLOWUP_PROMPT, SCREENSHOT_PENDING_NOTE,
};
use crate::registry::{ToolRegistry, ToolSpec};

/// Drives one conversation against a chat gateway.
///
/// The transcript is owned exclusively by this instance; successive
/// [`run`](Self::run) calls accumulate a multi-turn conversation until
/// [`reset`](Self::reset) truncates it back to the system prompt.
pub struct Agent {
    config: AgentConfig,
    gateway: Box<dyn ChatGateway>,
    registry: ToolRegistry,
    transcript: Transcript,
}

impl Agent {
    pub fn new(
        config: AgentConfig,
        gateway: Box<dyn ChatGateway>,
        system_prompt: Option<&str>,
    ) -> Self {
        Self {
            config,
            gateway,
            registry: ToolRegistry::new(),
            transcript: Transcript::new(system_prompt),
        }
    }

    /// Register a tool. Expected to happen before the first `run` call.
    pub fn register_tool(&mut self, spec: ToolSpec) {
        self.registry.register(spec);
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Clear the conversation, keeping only the system prompt
    pub fn reset(&mut self) {
        self.transcript.reset();
        info!("Conversation history reset");
    }

    /// Run the loop for one user input (optionally with an initial
    /// screenshot) until the model answers in plain text or the
    /// iteration budget is exhausted.
    ///
    /// Gateway failures are fatal to this call; the transcript keeps
    /// everything up to the failed request so the caller may resume.
    pub async fn run(&mut self, user_input: &str, image_base64: Option<String>) -> Result<String> {
        let user_turn = match &image_base64 {
            Some(image) => Turn::user_with_image(user_input, image),
            None => Turn::user(user_input),
        };
        self.transcript.append(user_turn);
        info!("User task: {}", user_input);

        for iteration in 1..=self.config.max_iterations {
            debug!("Iteration {}/{}", iteration, self.config.max_iterations);

            let projection = self.transcript.compact(self.config.max_screenshots);
            let schemas = self.registry.schemas();
            let message = self.gateway.complete(&projection, &schemas).await?;

            if !message.has_tool_calls() {
                // No tool calls: the (possibly empty) text is the reply
                let reply = message.content.unwrap_or_default();
                self.transcript.append(Turn::assistant(reply.clone()));
                info!("Final reply after {} iteration(s)", iteration);
                return Ok(reply);
            }

            // Record the assistant turn with its raw tool calls. Any text
            // that came along is kept in history but is not a final reply.
            let tool_calls = message.tool_calls.clone();
            self.transcript
                .append(Turn::assistant_tool_calls(message.content, tool_calls.clone()));

            for call in &tool_calls {
                self.handle_tool_call(call).await;
            }
        }

        warn!(
            "Stopping after {} iterations without a final reply",
            self.config.max_iterations
        );
        Ok(MAX_ITERATIONS_REPLY.to_string())
    }

    /// Dispatch one tool call and fold its outcome into the transcript:
    /// a tool turn with the text, plus a user turn carrying the
    /// screenshot when the outcome produced one.
    async fn handle_tool_call(&mut self, call: &ToolCall) {
        let name = &call.function.name;
        let arguments = parse_arguments(&call.function.arguments);
        debug!("Tool call {}: {}({})", call.id, name, arguments);

        let outcome = self.registry.dispatch(name, arguments).await;

        let mut text = outcome.text;
        if outcome.image.is_some() {
            text.push_str(SCREENSHOT_PENDING_NOTE);
        }
        self.transcript.append(Turn::tool(call.id.clone(), text));

        // Image outcomes become a fresh user turn; some backends only
        // accept images on user messages.
        if let Some(image) = outcome.image {
            self.transcript
                .append(Turn::user_with_image(SCREENSHOT_FOLLOWUP_PROMPT, &image));
        }
    }
}

/// Parse the model-supplied argument string leniently: malformed JSON
/// degrades to an empty object instead of failing the call.
fn parse_arguments(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| json!({}))
}
