pub mod input;
pub mod screen;

pub use input::{ClickType, InputController, ScrollDirection};
pub use screen::ScreenCapture;

use std::process::Stdio;
use std::time::Duration;

use anyhow::Result;
use tokio::process::Command;
use tracing::debug;

/// Timeout for the platform helper commands (screencapture, xdotool, ...)
const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// Convert normalized 0-1000 coordinates to physical pixels.
///
/// The origin is the top-left corner; (1000, 1000) is the bottom-right.
pub fn normalize_to_screen(x: i64, y: i64, width: u32, height: u32) -> (i64, i64) {
    let clamp = |v: i64| v.clamp(0, 1000);
    (
        clamp(x) * width as i64 / 1000,
        clamp(y) * height as i64 / 1000,
    )
}

/// Run a helper command, capturing stdout. Non-zero exit is an error
/// carrying the command's stderr.
pub(crate) async fn run_cmd(program: &str, args: &[&str]) -> Result<String> {
    debug!("Running {} {:?}", program, args);

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| anyhow::anyhow!("failed to start '{}': {}", program, e))?;

    let output = tokio::time::timeout(CMD_TIMEOUT, child.wait_with_output())
        .await
        .map_err(|_| anyhow::anyhow!("'{}' timed out after {}s", program, CMD_TIMEOUT.as_secs()))??;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "'{}' failed with {}: {}",
            program,
            output.status,
            stderr.trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
