use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::FutureExt;
use serde::Deserialize;
use serde_json::{json, Value};
use visor_sandbox::Sandbox;

use crate::registry::{ToolOutcome, ToolSpec};

/// Hard ceiling on the per-call timeout the model may request
const MAX_TIMEOUT_SECS: u64 = 120;

const DESCRIPTION: &str = "\
Execute Python code and return its output. Useful for data processing, \
calculations and analysis. The code runs in a separate process with a \
30 second timeout by default.";

#[derive(Debug, Deserialize)]
struct ExecuteArgs {
    code: String,
    #[serde(default)]
    timeout: Option<u64>,
}

pub fn spec(sandbox: Arc<Sandbox>) -> ToolSpec {
    ToolSpec::new(
        "execute_python",
        DESCRIPTION,
        json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "description": "The Python code to execute"
                },
                "timeout": {
                    "type": "integer",
                    "description": "Timeout in seconds; defaults to 30, capped at 120"
                }
            },
            "required": ["code"]
        }),
        Arc::new(move |args| run(args, sandbox.clone()).boxed()),
    )
}

async fn run(args: Value, sandbox: Arc<Sandbox>) -> Result<ToolOutcome> {
    let args: ExecuteArgs =
        serde_json::from_value(args).context("invalid execute_python arguments")?;

    let timeout = args
        .timeout
        .map(|secs| Duration::from_secs(secs.min(MAX_TIMEOUT_SECS)));

    let result = sandbox.run(&args.code, timeout).await?;
    Ok(ToolOutcome::text(result.render()))
}
