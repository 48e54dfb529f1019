//! Concrete tool definitions exposed to the model: GUI control built on
//! `visor-control` and code execution built on `visor-sandbox`.

pub mod keyboard;
pub mod mouse;
pub mod sandbox;
pub mod screenshot;
pub mod scroll;

use std::sync::Arc;

use visor_control::{InputController, ScreenCapture};
use visor_sandbox::Sandbox;

use crate::registry::ToolSpec;

/// All GUI tools in the order they are presented to the model
pub fn gui_tools(screen: Arc<ScreenCapture>, input: Arc<InputController>) -> Vec<ToolSpec> {
    vec![
        screenshot::spec(screen.clone()),
        mouse::spec(input.clone(), screen.clone()),
        keyboard::spec(input.clone(), screen.clone()),
        scroll::spec(input, screen),
    ]
}

/// Sandboxed code execution tools
pub fn sandbox_tools(sandbox: Arc<Sandbox>) -> Vec<ToolSpec> {
    vec![sandbox::spec(sandbox)]
}
