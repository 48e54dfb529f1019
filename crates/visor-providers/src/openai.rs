use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::{AssistantMessage, ChatGateway, GatewayError, ToolCall, ToolSchema, Turn};

/// Gateway for OpenAI-compatible chat-completion endpoints.
///
/// Sends one blocking (non-streaming) request per call and parses the
/// first response choice. Also works against proxies that speak the same
/// protocol when pointed at their base URL.
#[derive(Clone)]
pub struct OpenAIGateway {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIGateway {
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        })
    }

    fn create_request_body(&self, turns: &[Turn], tools: &[ToolSchema]) -> serde_json::Value {
        let mut body = json!({
            "model": self.model,
            "stream": false,
            "messages": turns,
        });

        if !tools.is_empty() {
            body["tools"] = json!(convert_tools(tools));
            body["tool_choice"] = json!("auto");
        }

        body
    }
}

#[async_trait::async_trait]
impl ChatGateway for OpenAIGateway {
    async fn complete(
        &self,
        turns: &[Turn],
        tools: &[ToolSchema],
    ) -> Result<AssistantMessage, GatewayError> {
        debug!(
            "Sending completion request: model={}, {} turns, {} tools",
            self.model,
            turns.len(),
            tools.len()
        );

        let body = self.create_request_body(turns, tools);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GatewayError::Status { status, body });
        }

        let text = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        parse_response(value)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn convert_tools(tools: &[ToolSchema]) -> Vec<serde_json::Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "type": "function",
                "function": {
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.parameters,
                }
            })
        })
        .collect()
}

/// Parse a chat-completion response body into the assistant message.
///
/// A top-level `error` field is fatal; so is a missing choice/message
/// structure.
pub fn parse_response(value: serde_json::Value) -> Result<AssistantMessage, GatewayError> {
    if let Some(error) = value.get("error") {
        return Err(GatewayError::Api(error.to_string()));
    }

    let message = value
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| {
            GatewayError::MalformedResponse("missing choices[0].message".to_string())
        })?;

    let content = message
        .get("content")
        .and_then(|c| c.as_str())
        .map(str::to_string);

    let tool_calls = match message.get("tool_calls") {
        Some(calls) if !calls.is_null() => {
            serde_json::from_value::<Vec<ToolCall>>(calls.clone())
                .map_err(|e| GatewayError::MalformedResponse(format!("bad tool_calls: {}", e)))?
        }
        _ => Vec::new(),
    };

    Ok(AssistantMessage {
        content,
        tool_calls,
    })
}
