//! Screen capture via the platform screenshot utility.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use base64::Engine;
use tracing::{debug, warn};

use crate::run_cmd;

/// Captures the screen as a base64-encoded PNG.
///
/// Shells out to the platform utility instead of linking native capture
/// libraries; the helpers already handle HiDPI and multi-display setups.
pub struct ScreenCapture {
    /// Settle delay used by [`capture_after_action`](Self::capture_after_action)
    action_delay: Duration,
    /// When set, every capture is also saved here with a timestamped name
    save_dir: Option<PathBuf>,
}

impl ScreenCapture {
    pub fn new(action_delay: Duration, save_dir: Option<PathBuf>) -> Self {
        Self {
            action_delay,
            save_dir,
        }
    }

    /// Capture the screen immediately
    pub async fn capture(&self) -> Result<String> {
        self.capture_with_delay(Duration::ZERO).await
    }

    /// Capture after the configured settle delay, letting the UI react
    /// to the action that was just performed
    pub async fn capture_after_action(&self) -> Result<String> {
        self.capture_with_delay(self.action_delay).await
    }

    async fn capture_with_delay(&self, delay: Duration) -> Result<String> {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let ts = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
        let path = std::env::temp_dir().join(format!("visor_screen_{}.png", ts));
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("non-UTF8 temp path"))?
            .to_string();

        let capture_result = capture_to(&path_str).await;

        let result = match capture_result {
            Ok(()) => {
                let bytes = tokio::fs::read(&path).await?;
                if bytes.is_empty() {
                    anyhow::bail!("screenshot file is empty; is screen capture permitted?");
                }
                if let Some(dir) = &self.save_dir {
                    if let Err(e) = self.save_copy(dir.clone(), &bytes, &ts.to_string()).await {
                        warn!("Could not save screenshot copy: {}", e);
                    }
                }
                debug!("Captured screenshot ({} bytes)", bytes.len());
                Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
            }
            Err(e) => Err(e),
        };

        let _ = tokio::fs::remove_file(&path).await;
        result
    }

    async fn save_copy(&self, dir: PathBuf, bytes: &[u8], ts: &str) -> Result<()> {
        tokio::fs::create_dir_all(&dir).await?;
        let target = dir.join(format!("screenshot_{}.png", ts));
        tokio::fs::write(&target, bytes).await?;
        debug!("Saved screenshot to {}", target.display());
        Ok(())
    }

    /// Current screen resolution in physical pixels
    pub async fn screen_size(&self) -> Result<(u32, u32)> {
        screen_size().await
    }
}

#[cfg(target_os = "macos")]
async fn capture_to(path: &str) -> Result<()> {
    run_cmd("screencapture", &["-x", "-t", "png", path]).await?;
    Ok(())
}

#[cfg(target_os = "linux")]
async fn capture_to(path: &str) -> Result<()> {
    // Try the commonly installed utilities in order
    let attempts: [(&str, Vec<&str>); 3] = [
        ("gnome-screenshot", vec!["-f", path]),
        ("import", vec!["-window", "root", path]),
        ("scrot", vec![path]),
    ];

    let mut last_error = None;
    for (program, args) in attempts {
        match run_cmd(program, &args).await {
            Ok(_) => return Ok(()),
            Err(e) => {
                debug!("{} unavailable: {}", program, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| anyhow::anyhow!("no screenshot utility found"))
        .context("install gnome-screenshot, imagemagick or scrot"))
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
async fn capture_to(_path: &str) -> Result<()> {
    anyhow::bail!("screen capture is not supported on this platform")
}

#[cfg(target_os = "macos")]
pub(crate) async fn screen_size() -> Result<(u32, u32)> {
    // Finder reports the desktop bounds as "0, 0, width, height"
    let out = run_cmd(
        "osascript",
        &["-e", "tell application \"Finder\" to get bounds of window of desktop"],
    )
    .await?;
    parse_desktop_bounds(&out)
}

#[cfg(target_os = "linux")]
pub(crate) async fn screen_size() -> Result<(u32, u32)> {
    let out = run_cmd("xdotool", &["getdisplaygeometry"]).await?;
    parse_display_geometry(&out)
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub(crate) async fn screen_size() -> Result<(u32, u32)> {
    anyhow::bail!("screen size query is not supported on this platform")
}

#[allow(dead_code)]
fn parse_desktop_bounds(out: &str) -> Result<(u32, u32)> {
    let parts: Vec<u32> = out
        .trim()
        .split(',')
        .filter_map(|p| p.trim().parse().ok())
        .collect();
    if parts.len() != 4 {
        anyhow::bail!("unexpected desktop bounds: {}", out.trim());
    }
    Ok((parts[2], parts[3]))
}

#[allow(dead_code)]
fn parse_display_geometry(out: &str) -> Result<(u32, u32)> {
    let mut it = out.trim().split_whitespace();
    let width = it.next().and_then(|w| w.parse().ok());
    let height = it.next().and_then(|h| h.parse().ok());
    match (width, height) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => anyhow::bail!("unexpected display geometry: {}", out.trim()),
    }
}
