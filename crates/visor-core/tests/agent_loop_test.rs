//! End-to-end tests of the orchestration loop against a scripted gateway.

use std::sync::{Arc, Mutex};

use futures_util::FutureExt;
use serde_json::{json, Value};
use visor_config::AgentConfig;
use visor_core::prompts::{
    MAX_ITERATIONS_REPLY, SCREENSHOT_FOLLOWUP_PROMPT, SCREENSHOT_PENDING_NOTE,
};
use visor_core::{Agent, ToolOutcome, ToolSpec};
use visor_providers::{mock::next_call_id, AssistantMessage, MockGateway, Role, ToolCall, Turn};

fn test_config(max_iterations: u32) -> AgentConfig {
    AgentConfig {
        max_iterations,
        timeout_seconds: 120,
        max_screenshots: 5,
    }
}

fn agent_with(gateway: Arc<MockGateway>, max_iterations: u32) -> Agent {
    Agent::new(
        test_config(max_iterations),
        Box::new(gateway),
        Some("You are a test assistant."),
    )
}

/// Tool that replies with fixed text and records the arguments it received
fn recording_tool(name: &str, seen: Arc<Mutex<Vec<Value>>>) -> ToolSpec {
    ToolSpec::new(
        name,
        "records its arguments",
        json!({"type": "object", "properties": {}}),
        Arc::new(move |args| {
            let seen = seen.clone();
            async move {
                seen.lock().unwrap().push(args);
                Ok::<_, anyhow::Error>(ToolOutcome::text("recorded"))
            }
            .boxed()
        }),
    )
}

fn failing_tool(name: &str) -> ToolSpec {
    ToolSpec::new(
        name,
        "always fails",
        json!({"type": "object", "properties": {}}),
        Arc::new(|_args| {
            async { Err::<ToolOutcome, anyhow::Error>(anyhow::anyhow!("screen unavailable")) }
                .boxed()
        }),
    )
}

fn screenshot_tool(name: &str) -> ToolSpec {
    ToolSpec::new(
        name,
        "returns an image",
        json!({"type": "object", "properties": {}}),
        Arc::new(|_args| {
            async {
                Ok::<_, anyhow::Error>(ToolOutcome::with_image("Took a screenshot.", "aW1hZ2U="))
            }
            .boxed()
        }),
    )
}

fn tool_call_reply(tool: &str, arguments: &str) -> AssistantMessage {
    AssistantMessage {
        content: None,
        tool_calls: vec![ToolCall::new(next_call_id(), tool, arguments)],
    }
}

#[tokio::test]
async fn test_plain_text_reply_ends_the_run() {
    let gateway = Arc::new(MockGateway::new().with_text("2"));
    let mut agent = agent_with(gateway.clone(), 10);

    let reply = agent.run("what is 1 + 1?", None).await.unwrap();

    assert_eq!(reply, "2");
    assert_eq!(gateway.call_count(), 1);
    // System, user, assistant
    assert_eq!(agent.transcript().len(), 3);
    assert_eq!(agent.transcript().turns()[2].role, Role::Assistant);
}

#[tokio::test]
async fn test_iteration_budget_yields_fixed_sentinel() {
    let gateway = Arc::new(MockGateway::new().repeating(tool_call_reply("probe", "{}")));
    let mut agent = agent_with(gateway.clone(), 3);
    agent.register_tool(recording_tool("probe", Arc::new(Mutex::new(Vec::new()))));

    let reply = agent.run("loop forever", None).await.unwrap();

    assert_eq!(reply, MAX_ITERATIONS_REPLY);
    assert_eq!(gateway.call_count(), 3);
}

#[tokio::test]
async fn test_tool_result_is_fed_back_as_tool_turn() {
    let gateway = Arc::new(
        MockGateway::new()
            .with_reply(tool_call_reply("probe", r#"{"x": 5}"#))
            .with_text("done"),
    );
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut agent = agent_with(gateway.clone(), 10);
    agent.register_tool(recording_tool("probe", seen.clone()));

    let reply = agent.run("use the tool", None).await.unwrap();

    assert_eq!(reply, "done");
    assert_eq!(seen.lock().unwrap().as_slice(), &[json!({"x": 5})]);

    // The second request must contain the tool turn with the outcome text
    let requests = gateway.requests();
    assert_eq!(requests.len(), 2);
    let tool_turn = requests[1]
        .iter()
        .find(|t| t.role == Role::Tool)
        .expect("tool turn present");
    assert!(tool_turn.tool_call_id.is_some());
    let rendered = serde_json::to_string(&tool_turn.content).unwrap();
    assert!(rendered.contains("recorded"));
}

#[tokio::test]
async fn test_unknown_tool_is_recoverable() {
    let gateway = Arc::new(
        MockGateway::new()
            .with_reply(tool_call_reply("no_such_tool", "{}"))
            .with_text("recovered"),
    );
    let mut agent = agent_with(gateway.clone(), 10);

    let reply = agent.run("call something odd", None).await.unwrap();

    assert_eq!(reply, "recovered");
    let requests = gateway.requests();
    let rendered = serde_json::to_string(&requests[1]).unwrap();
    assert!(rendered.contains("unknown tool 'no_such_tool'"));
}

#[tokio::test]
async fn test_handler_error_becomes_tool_text_and_loop_continues() {
    let gateway = Arc::new(
        MockGateway::new()
            .with_reply(tool_call_reply("broken", "{}"))
            .with_text("gave up on the tool"),
    );
    let mut agent = agent_with(gateway.clone(), 10);
    agent.register_tool(failing_tool("broken"));

    let reply = agent.run("try the broken tool", None).await.unwrap();

    assert_eq!(reply, "gave up on the tool");
    let rendered = serde_json::to_string(&gateway.requests()[1]).unwrap();
    assert!(rendered.contains("Tool execution failed"));
    assert!(rendered.contains("screen unavailable"));
}

#[tokio::test]
async fn test_malformed_arguments_degrade_to_empty_object() {
    let gateway = Arc::new(
        MockGateway::new()
            .with_reply(tool_call_reply("probe", "not json at all"))
            .with_text("ok"),
    );
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut agent = agent_with(gateway.clone(), 10);
    agent.register_tool(recording_tool("probe", seen.clone()));

    agent.run("bad args", None).await.unwrap();

    assert_eq!(seen.lock().unwrap().as_slice(), &[json!({})]);
}

#[tokio::test]
async fn test_image_outcome_is_promoted_to_user_turn() {
    let gateway = Arc::new(
        MockGateway::new()
            .with_reply(tool_call_reply("shot", "{}"))
            .with_text("I can see it"),
    );
    let mut agent = agent_with(gateway.clone(), 10);
    agent.register_tool(screenshot_tool("shot"));

    agent.run("take a look", None).await.unwrap();

    let requests = gateway.requests();
    let turns = &requests[1];

    // The tool turn itself carries text only, with the pending note
    let tool_turn = turns.iter().find(|t| t.role == Role::Tool).unwrap();
    assert!(!tool_turn.has_image());
    let rendered = serde_json::to_string(&tool_turn.content).unwrap();
    assert!(rendered.contains(SCREENSHOT_PENDING_NOTE.trim()));

    // The image arrives in a user turn right after it
    let tool_pos = turns.iter().position(|t| t.role == Role::Tool).unwrap();
    let followup = &turns[tool_pos + 1];
    assert_eq!(followup.role, Role::User);
    assert!(followup.has_image());
    let rendered = serde_json::to_string(&followup.content).unwrap();
    assert!(rendered.contains(SCREENSHOT_FOLLOWUP_PROMPT));
}

#[tokio::test]
async fn test_assistant_text_beside_tool_calls_is_not_the_reply() {
    let gateway = Arc::new(
        MockGateway::new()
            .with_reply(AssistantMessage {
                content: Some("thinking out loud".to_string()),
                tool_calls: vec![ToolCall::new(next_call_id(), "probe", "{}")],
            })
            .with_text("the actual answer"),
    );
    let mut agent = agent_with(gateway.clone(), 10);
    agent.register_tool(recording_tool("probe", Arc::new(Mutex::new(Vec::new()))));

    let reply = agent.run("go", None).await.unwrap();

    assert_eq!(reply, "the actual answer");
    // The interim text is still visible in the next request
    let rendered = serde_json::to_string(&gateway.requests()[1]).unwrap();
    assert!(rendered.contains("thinking out loud"));
}

#[tokio::test]
async fn test_multiple_tool_calls_run_in_order() {
    let gateway = Arc::new(
        MockGateway::new()
            .with_reply(AssistantMessage {
                content: None,
                tool_calls: vec![
                    ToolCall::new(next_call_id(), "probe", r#"{"step": 1}"#),
                    ToolCall::new(next_call_id(), "probe", r#"{"step": 2}"#),
                ],
            })
            .with_text("both done"),
    );
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut agent = agent_with(gateway.clone(), 10);
    agent.register_tool(recording_tool("probe", seen.clone()));

    let reply = agent.run("two steps", None).await.unwrap();

    assert_eq!(reply, "both done");
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[json!({"step": 1}), json!({"step": 2})]
    );
}

#[tokio::test]
async fn test_initial_screenshot_is_attached_to_the_task() {
    let gateway = Arc::new(MockGateway::new().with_text("I see the screen"));
    let mut agent = agent_with(gateway.clone(), 10);

    agent
        .run("describe the screen", Some("aW1hZ2U=".to_string()))
        .await
        .unwrap();

    let first_request = &gateway.requests()[0];
    let user_turn = first_request.iter().find(|t| t.role == Role::User).unwrap();
    assert!(user_turn.has_image());
}

#[tokio::test]
async fn test_conversation_accumulates_across_runs() {
    let gateway = Arc::new(MockGateway::new().with_text("four").with_text("eight"));
    let mut agent = agent_with(gateway.clone(), 10);

    agent.run("what is 2 + 2?", None).await.unwrap();
    agent.run("double it", None).await.unwrap();

    // The second request replays the whole first exchange
    let second_request = &gateway.requests()[1];
    let rendered = serde_json::to_string(second_request).unwrap();
    assert!(rendered.contains("what is 2 + 2?"));
    assert!(rendered.contains("four"));
    assert!(rendered.contains("double it"));
}

#[tokio::test]
async fn test_reset_truncates_back_to_system_prompt() {
    let gateway = Arc::new(MockGateway::new().with_text("hi").with_text("hello again"));
    let mut agent = agent_with(gateway.clone(), 10);

    agent.run("first", None).await.unwrap();
    agent.reset();
    agent.run("second", None).await.unwrap();

    let second_request = &gateway.requests()[1];
    let rendered = serde_json::to_string(second_request).unwrap();
    assert!(!rendered.contains("first"));
    assert!(rendered.contains("second"));
}

#[tokio::test]
async fn test_gateway_failure_is_fatal_but_transcript_survives() {
    // Script runs dry on the second request, producing an API error
    let gateway = Arc::new(MockGateway::new().with_reply(tool_call_reply("probe", "{}")));
    let mut agent = agent_with(gateway.clone(), 10);
    agent.register_tool(recording_tool("probe", Arc::new(Mutex::new(Vec::new()))));

    let result = agent.run("go", None).await;

    assert!(result.is_err());
    // Everything up to the failed request is retained
    let roles: Vec<Role> = agent.transcript().turns().iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::Assistant, Role::Tool]
    );
}

#[tokio::test]
async fn test_requests_are_projected_through_compaction() {
    let max_screenshots = 5;
    // Seven screenshot rounds, then a final answer
    let mut gateway = MockGateway::new();
    for _ in 0..7 {
        gateway = gateway.with_reply(tool_call_reply("shot", "{}"));
    }
    let gateway = Arc::new(gateway.with_text("enough"));
    let mut agent = agent_with(gateway.clone(), 20);
    agent.register_tool(screenshot_tool("shot"));

    let reply = agent.run("keep looking", None).await.unwrap();
    assert_eq!(reply, "enough");

    let requests = gateway.requests();
    let last = requests.last().unwrap();
    let image_count = last.iter().filter(|t| t.has_image()).count();
    assert_eq!(image_count, max_screenshots);

    // Older screenshots leave a text trace instead of vanishing silently
    let rendered = serde_json::to_string(last).unwrap();
    assert!(rendered.contains("[screenshot omitted]"));
}
