use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::FutureExt;
use serde::Deserialize;
use serde_json::{json, Value};
use visor_control::{ClickType, InputController, ScreenCapture};

use crate::registry::{ToolOutcome, ToolSpec};

const DESCRIPTION: &str = "\
Type text into the focused element.

Usage patterns:
1. Type only: type_text(text=\"hello\") types at the current focus
2. Click then type: type_text(text=\"hello\", x=?, y=?) clicks the coordinates to focus first
3. Type and submit: type_text(text=\"hello\", press_enter=true) presses Enter afterwards
4. Full flow: type_text(text=\"hello\", x=?, y=?, press_enter=true)

Typical uses:
- Search box: click it via coordinates, type the query, press_enter=true to submit
- Form filling: click the field, type the value, leave press_enter off to continue with the next field";

#[derive(Debug, Deserialize)]
struct TypeTextArgs {
    text: String,
    #[serde(default)]
    x: Option<i64>,
    #[serde(default)]
    y: Option<i64>,
    #[serde(default)]
    press_enter: bool,
}

pub fn spec(input: Arc<InputController>, screen: Arc<ScreenCapture>) -> ToolSpec {
    ToolSpec::new(
        "type_text",
        DESCRIPTION,
        json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "The text to type"
                },
                "x": {
                    "type": "integer",
                    "description": "Optional X coordinate (0-1000) to click before typing"
                },
                "y": {
                    "type": "integer",
                    "description": "Optional Y coordinate (0-1000) to click before typing"
                },
                "press_enter": {
                    "type": "boolean",
                    "description": "Whether to press Enter after typing",
                    "default": false
                }
            },
            "required": ["text"]
        }),
        Arc::new(move |args| run(args, input.clone(), screen.clone()).boxed()),
    )
}

async fn run(
    args: Value,
    input: Arc<InputController>,
    screen: Arc<ScreenCapture>,
) -> Result<ToolOutcome> {
    let args: TypeTextArgs =
        serde_json::from_value(args).context("invalid type_text arguments")?;

    let mut report = Vec::new();

    if let (Some(x), Some(y)) = (args.x, args.y) {
        input.click(x, y, ClickType::Left).await?;
        // Let the click land before the keystrokes
        tokio::time::sleep(Duration::from_millis(200)).await;
        report.push(format!("Clicked ({}, {}) to focus", x, y));
    }

    input.type_text(&args.text).await?;
    report.push(format!("Typed: {}", args.text));

    if args.press_enter {
        input.press_enter().await?;
        report.push("Pressed Enter".to_string());
    }

    let image = screen.capture_after_action().await?;
    Ok(ToolOutcome::with_image(report.join(", ") + ".", image))
}
