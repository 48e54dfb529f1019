use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::FutureExt;
use serde::Deserialize;
use serde_json::{json, Value};
use visor_control::{ClickType, InputController, ScreenCapture};

use crate::registry::{ToolOutcome, ToolSpec};

const DESCRIPTION: &str = "\
Perform a mouse click at the given coordinates.

Coordinate system:
- Normalized 0-1000 coordinates, independent of the physical resolution
- The origin (0, 0) is the top-left corner of the screen
- The bottom-right corner is (1000, 1000)
- For example, the screen center is (500, 500)

Click types:
- left: single left click (default)
- right: right click, for opening context menus
- double: double left click, for opening files or selecting words";

#[derive(Debug, Deserialize)]
struct ClickArgs {
    x: i64,
    y: i64,
    #[serde(default)]
    click_type: Option<String>,
}

pub fn spec(input: Arc<InputController>, screen: Arc<ScreenCapture>) -> ToolSpec {
    ToolSpec::new(
        "click",
        DESCRIPTION,
        json!({
            "type": "object",
            "properties": {
                "x": {
                    "type": "integer",
                    "description": "X coordinate (0-1000); 0 is the far left, 1000 the far right"
                },
                "y": {
                    "type": "integer",
                    "description": "Y coordinate (0-1000); 0 is the top, 1000 the bottom"
                },
                "click_type": {
                    "type": "string",
                    "description": "Click type: left (single), right (context menu), double (double click)",
                    "enum": ["left", "right", "double"],
                    "default": "left"
                }
            },
            "required": ["x", "y"]
        }),
        Arc::new(move |args| run(args, input.clone(), screen.clone()).boxed()),
    )
}

async fn run(
    args: Value,
    input: Arc<InputController>,
    screen: Arc<ScreenCapture>,
) -> Result<ToolOutcome> {
    let args: ClickArgs = serde_json::from_value(args).context("invalid click arguments")?;
    let click_type = ClickType::from_arg(args.click_type.as_deref().unwrap_or("left"));

    input.click(args.x, args.y, click_type).await?;

    let image = screen.capture_after_action().await?;
    Ok(ToolOutcome::with_image(
        format!("{} at ({}, {}).", capitalize(click_type.describe()), args.x, args.y),
        image,
    ))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
