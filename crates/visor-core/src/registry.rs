//! Tool registry: the name-to-handler dispatch table exposed to the model.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use futures_util::future::BoxFuture;
use serde_json::Value;
use tracing::{debug, warn};
use visor_providers::ToolSchema;

/// Async handler invoked with the parsed argument object
pub type ToolHandler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<ToolOutcome>> + Send + Sync>;

/// Result of one tool invocation: text, and optionally a base64 PNG
/// screenshot to be promoted into a user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub text: String,
    pub image: Option<String>,
}

impl ToolOutcome {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn with_image(text: impl Into<String>, image_base64: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: Some(image_base64.into()),
        }
    }
}

/// Static descriptor of one invocable capability.
#[derive(Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON-schema object describing the arguments
    pub parameters: Value,
    pub handler: ToolHandler,
}

impl ToolSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        handler: ToolHandler,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler,
        }
    }

    /// Model-facing schema for this tool
    pub fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
        }
    }
}

impl fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSpec")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Registry of tools keyed by name, preserving registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<ToolSpec>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any existing tool with the same name in
    /// place (its position in the listing is kept)
    pub fn register(&mut self, spec: ToolSpec) {
        debug!("Registering tool: {}", spec.name);
        if let Some(existing) = self.tools.iter_mut().find(|t| t.name == spec.name) {
            *existing = spec;
        } else {
            self.tools.push(spec);
        }
    }

    pub fn specs(&self) -> &[ToolSpec] {
        &self.tools
    }

    /// Schemas in registration order, as sent to the model
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(ToolSpec::schema).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name. Never fails: unknown names and handler
    /// errors are reported inside the returned outcome's text.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> ToolOutcome {
        let Some(tool) = self.tools.iter().find(|t| t.name == name) else {
            warn!("Unknown tool requested: {}", name);
            return ToolOutcome::text(format!("Error: unknown tool '{}'", name));
        };

        match (tool.handler)(arguments).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Tool '{}' failed: {:#}", name, e);
                ToolOutcome::text(format!("Tool execution failed: {:#}", e))
            }
        }
    }
}
