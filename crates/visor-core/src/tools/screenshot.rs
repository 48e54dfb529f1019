use std::sync::Arc;

use anyhow::Result;
use futures_util::FutureExt;
use serde_json::{json, Value};
use visor_control::ScreenCapture;

use crate::registry::{ToolOutcome, ToolSpec};

pub fn spec(screen: Arc<ScreenCapture>) -> ToolSpec {
    ToolSpec::new(
        "screenshot",
        "Take a screenshot of the current screen.",
        json!({
            "type": "object",
            "properties": {},
            "required": []
        }),
        Arc::new(move |args| run(args, screen.clone()).boxed()),
    )
}

async fn run(_args: Value, screen: Arc<ScreenCapture>) -> Result<ToolOutcome> {
    let image = screen.capture().await?;
    Ok(ToolOutcome::with_image(
        "Captured a screenshot of the current screen.",
        image,
    ))
}
