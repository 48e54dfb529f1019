//! CLI argument parsing for Visor.

use clap::Parser;

#[derive(Parser, Clone)]
#[command(name = "visor")]
#[command(about = "A screenshot-driven GUI automation agent")]
#[command(version)]
pub struct Cli {
    /// Task to execute, e.g. "open the browser and search for rust"
    pub task: String,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the configured API base URL
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Override the configured API key
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Override the configured model name
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Maximum model round-trips before giving up
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<u32>,

    /// Skip the initial screenshot sent with the task
    #[arg(long)]
    pub no_screenshot: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
