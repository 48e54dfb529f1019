//! Pointer and keyboard injection via the platform input utility
//! (`cliclick` on macOS, `xdotool` on Linux).

use anyhow::Result;
use tracing::debug;

use crate::{normalize_to_screen, screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickType {
    Left,
    Right,
    Double,
}

impl ClickType {
    /// Lenient parse of the model-supplied argument; anything
    /// unrecognized falls back to a left click
    pub fn from_arg(arg: &str) -> Self {
        match arg {
            "right" => Self::Right,
            "double" => Self::Double,
            _ => Self::Left,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Left => "clicked",
            Self::Right => "right-clicked",
            Self::Double => "double-clicked",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    pub fn from_arg(arg: &str) -> Self {
        if arg == "up" {
            Self::Up
        } else {
            Self::Down
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Injects pointer and keyboard events. Coordinates are taken in the
/// normalized 0-1000 space and converted against the live screen size.
#[derive(Default)]
pub struct InputController;

impl InputController {
    pub fn new() -> Self {
        Self
    }

    pub async fn click(&self, x: i64, y: i64, click_type: ClickType) -> Result<()> {
        let (px, py) = self.to_pixels(x, y).await?;
        debug!("{} at ({}, {}) -> pixel ({}, {})", click_type.describe(), x, y, px, py);
        click_at(px, py, click_type).await
    }

    pub async fn move_to(&self, x: i64, y: i64) -> Result<()> {
        let (px, py) = self.to_pixels(x, y).await?;
        move_pointer(px, py).await
    }

    /// Move the pointer to the position, then scroll by `amount` wheel units
    pub async fn scroll(
        &self,
        x: i64,
        y: i64,
        direction: ScrollDirection,
        amount: i64,
    ) -> Result<()> {
        self.move_to(x, y).await?;
        debug!("Scrolling {} by {} at ({}, {})", direction.as_str(), amount, x, y);
        scroll_wheel(direction, amount.max(1)).await
    }

    pub async fn type_text(&self, text: &str) -> Result<()> {
        debug!("Typing {} chars", text.len());
        type_text(text).await
    }

    pub async fn press_enter(&self) -> Result<()> {
        press_enter().await
    }

    async fn to_pixels(&self, x: i64, y: i64) -> Result<(i64, i64)> {
        let (width, height) = screen::screen_size().await?;
        Ok(normalize_to_screen(x, y, width, height))
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use super::*;
    use crate::run_cmd;

    pub async fn click_at(px: i64, py: i64, click_type: ClickType) -> Result<()> {
        let prefix = match click_type {
            ClickType::Left => "c",
            ClickType::Right => "rc",
            ClickType::Double => "dc",
        };
        run_cmd("cliclick", &[&format!("{}:{},{}", prefix, px, py)]).await?;
        Ok(())
    }

    pub async fn move_pointer(px: i64, py: i64) -> Result<()> {
        run_cmd("cliclick", &[&format!("m:{},{}", px, py)]).await?;
        Ok(())
    }

    pub async fn scroll_wheel(direction: ScrollDirection, amount: i64) -> Result<()> {
        let signed = match direction {
            ScrollDirection::Up => amount,
            ScrollDirection::Down => -amount,
        };
        let script = format!("tell application \"System Events\" to scroll by {}", signed);
        run_cmd("osascript", &["-e", &script]).await?;
        Ok(())
    }

    pub async fn type_text(text: &str) -> Result<()> {
        run_cmd("cliclick", &[&format!("t:{}", text)]).await?;
        Ok(())
    }

    pub async fn press_enter() -> Result<()> {
        run_cmd("cliclick", &["kp:return"]).await?;
        Ok(())
    }
}

#[cfg(target_os = "linux")]
mod platform {
    use super::*;
    use crate::run_cmd;

    pub async fn click_at(px: i64, py: i64, click_type: ClickType) -> Result<()> {
        let px = px.to_string();
        let py = py.to_string();
        run_cmd("xdotool", &["mousemove", &px, &py]).await?;
        match click_type {
            ClickType::Left => run_cmd("xdotool", &["click", "1"]).await?,
            ClickType::Right => run_cmd("xdotool", &["click", "3"]).await?,
            ClickType::Double => run_cmd("xdotool", &["click", "--repeat", "2", "1"]).await?,
        };
        Ok(())
    }

    pub async fn move_pointer(px: i64, py: i64) -> Result<()> {
        run_cmd("xdotool", &["mousemove", &px.to_string(), &py.to_string()]).await?;
        Ok(())
    }

    pub async fn scroll_wheel(direction: ScrollDirection, amount: i64) -> Result<()> {
        // Wheel up is button 4, wheel down is button 5
        let button = match direction {
            ScrollDirection::Up => "4",
            ScrollDirection::Down => "5",
        };
        run_cmd("xdotool", &["click", "--repeat", &amount.to_string(), button]).await?;
        Ok(())
    }

    pub async fn type_text(text: &str) -> Result<()> {
        run_cmd("xdotool", &["type", "--delay", "50", "--", text]).await?;
        Ok(())
    }

    pub async fn press_enter() -> Result<()> {
        run_cmd("xdotool", &["key", "Return"]).await?;
        Ok(())
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
mod platform {
    use super::*;

    pub async fn click_at(_px: i64, _py: i64, _click_type: ClickType) -> Result<()> {
        anyhow::bail!("input injection is not supported on this platform")
    }

    pub async fn move_pointer(_px: i64, _py: i64) -> Result<()> {
        anyhow::bail!("input injection is not supported on this platform")
    }

    pub async fn scroll_wheel(_direction: ScrollDirection, _amount: i64) -> Result<()> {
        anyhow::bail!("input injection is not supported on this platform")
    }

    pub async fn type_text(_text: &str) -> Result<()> {
        anyhow::bail!("input injection is not supported on this platform")
    }

    pub async fn press_enter() -> Result<()> {
        anyhow::bail!("input injection is not supported on this platform")
    }
}

use platform::{click_at, move_pointer, press_enter, scroll_wheel, type_text};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_type_from_arg() {
        assert_eq!(ClickType::from_arg("left"), ClickType::Left);
        assert_eq!(ClickType::from_arg("right"), ClickType::Right);
        assert_eq!(ClickType::from_arg("double"), ClickType::Double);
        // Unknown values fall back to a left click
        assert_eq!(ClickType::from_arg("middle"), ClickType::Left);
    }

    #[test]
    fn test_scroll_direction_from_arg() {
        assert_eq!(ScrollDirection::from_arg("up"), ScrollDirection::Up);
        assert_eq!(ScrollDirection::from_arg("down"), ScrollDirection::Down);
        assert_eq!(ScrollDirection::from_arg("sideways"), ScrollDirection::Down);
    }
}
