//! Visor CLI - command-line entry point for the GUI automation agent.

mod cli_args;
mod system_prompt;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use visor_config::Config;
use visor_control::{InputController, ScreenCapture};
use visor_core::tools::{gui_tools, sandbox_tools};
use visor_core::Agent;
use visor_providers::OpenAIGateway;
use visor_sandbox::Sandbox;

pub use cli_args::Cli;
use system_prompt::SYSTEM_PROMPT;

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = Config::load_with_overrides(
        cli.config.as_deref(),
        cli.api_url.clone(),
        cli.api_key.clone(),
        cli.model.clone(),
        cli.max_iterations,
    )?;

    let api_key = config.gateway.resolved_api_key();
    if api_key.is_empty() {
        anyhow::bail!(
            "No API key configured. Set gateway.api_key in the config file \
             or the VISOR_API_KEY environment variable."
        );
    }

    let gateway = OpenAIGateway::new(
        api_key,
        config.gateway.model.clone(),
        Some(config.gateway.api_url.clone()),
        Duration::from_secs(config.agent.timeout_seconds),
    )
    .context("failed to construct the chat gateway")?;
    info!("Using model {} at {}", config.gateway.model, config.gateway.api_url);

    let screen = Arc::new(ScreenCapture::new(
        Duration::from_millis(config.control.screenshot_delay_ms),
        config.control.screenshot_dir.clone().map(PathBuf::from),
    ));
    let input = Arc::new(InputController::new());
    let sandbox = Arc::new(Sandbox::new(
        config.sandbox.interpreter.clone(),
        Duration::from_secs(config.sandbox.timeout_seconds),
    ));

    let mut agent = Agent::new(config.agent.clone(), Box::new(gateway), Some(SYSTEM_PROMPT));
    for spec in gui_tools(screen.clone(), input) {
        agent.register_tool(spec);
    }
    for spec in sandbox_tools(sandbox) {
        agent.register_tool(spec);
    }

    // Attach a screenshot of the starting state so the model sees the
    // screen before its first action. A capture failure is not fatal;
    // the model can always call the screenshot tool itself.
    let initial_screenshot = if cli.no_screenshot {
        None
    } else {
        match screen.capture().await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Could not take the initial screenshot: {:#}", e);
                None
            }
        }
    };

    let reply = agent.run(&cli.task, initial_screenshot).await?;
    println!("{}", reply);

    Ok(())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
