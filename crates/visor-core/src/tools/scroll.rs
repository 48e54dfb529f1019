use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::FutureExt;
use serde::Deserialize;
use serde_json::{json, Value};
use visor_control::{InputController, ScreenCapture, ScrollDirection};

use crate::registry::{ToolOutcome, ToolSpec};

const DESCRIPTION: &str = "\
Scroll the screen at the given position.

Coordinate system: normalized 0-1000 coordinates, (0,0) top-left, (1000,1000) bottom-right, (500,500) screen center.

Important:
- amount is in wheel units, not pixels or a fraction of the screen
- The exact distance per unit depends on the OS and application
- Suggested values: amount=3 small, amount=5 medium, amount=10 large
- If the scroll was too small or too large, check the screenshot and call again

Start with a small amount and adjust based on the screenshot feedback.";

fn default_amount() -> i64 {
    3
}

#[derive(Debug, Deserialize)]
struct ScrollArgs {
    x: i64,
    y: i64,
    direction: String,
    #[serde(default = "default_amount")]
    amount: i64,
}

pub fn spec(input: Arc<InputController>, screen: Arc<ScreenCapture>) -> ToolSpec {
    ToolSpec::new(
        "scroll",
        DESCRIPTION,
        json!({
            "type": "object",
            "properties": {
                "x": {
                    "type": "integer",
                    "description": "Normalized X coordinate (0-1000) where the pointer sits while scrolling"
                },
                "y": {
                    "type": "integer",
                    "description": "Normalized Y coordinate (0-1000) where the pointer sits while scrolling"
                },
                "direction": {
                    "type": "string",
                    "description": "Scroll direction: up to reveal content above, down to reveal content below",
                    "enum": ["up", "down"]
                },
                "amount": {
                    "type": "integer",
                    "description": "Wheel units: 3=small, 5=medium, 10=large. Defaults to 3",
                    "default": 3
                }
            },
            "required": ["x", "y", "direction"]
        }),
        Arc::new(move |args| run(args, input.clone(), screen.clone()).boxed()),
    )
}

async fn run(
    args: Value,
    input: Arc<InputController>,
    screen: Arc<ScreenCapture>,
) -> Result<ToolOutcome> {
    let args: ScrollArgs = serde_json::from_value(args).context("invalid scroll arguments")?;
    let direction = ScrollDirection::from_arg(&args.direction);

    input.scroll(args.x, args.y, direction, args.amount).await?;

    let image = screen.capture_after_action().await?;
    Ok(ToolOutcome::with_image(
        format!(
            "Scrolled {} by {} unit(s) at ({}, {}).",
            direction.as_str(),
            args.amount,
            args.x,
            args.y
        ),
        image,
    ))
}
