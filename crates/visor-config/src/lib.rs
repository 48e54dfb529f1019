use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub agent: AgentConfig,
    pub control: ControlConfig,
    pub sandbox: SandboxConfig,
}

/// Chat-completion endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of an OpenAI-compatible API (without the /chat/completions suffix)
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

impl GatewayConfig {
    /// API key from the config file, falling back to the environment
    pub fn resolved_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        std::env::var("VISOR_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .unwrap_or_default()
    }
}

/// Run-loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Ceiling on model round-trips per run() invocation
    pub max_iterations: u32,
    /// Request timeout for each gateway call, in seconds
    pub timeout_seconds: u64,
    /// Most-recent screenshots kept when projecting history for the model
    pub max_screenshots: usize,
}

/// Screen capture and input injection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Settle delay before the post-action screenshot, in milliseconds
    pub screenshot_delay_ms: u64,
    /// Directory where captured screenshots are also saved; disabled when unset
    pub screenshot_dir: Option<String>,
}

/// Sandboxed code execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Interpreter invoked with the temp file holding the code
    pub interpreter: String,
    /// Default wall-clock timeout, in seconds
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig {
                api_url: "https://api.openai.com/v1".to_string(),
                api_key: String::new(),
                model: "gpt-4o".to_string(),
            },
            agent: AgentConfig {
                max_iterations: 10,
                timeout_seconds: 120,
                max_screenshots: 5,
            },
            control: ControlConfig {
                screenshot_delay_ms: 500,
                screenshot_dir: None,
            },
            sandbox: SandboxConfig {
                interpreter: "python3".to_string(),
                timeout_seconds: 30,
            },
        }
    }
}

const DEFAULT_PATHS: [&str; 3] = ["./visor.toml", "~/.config/visor/config.toml", "~/.visor.toml"];

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let config_path_to_load = if let Some(path) = config_path {
            if !Path::new(path).exists() {
                anyhow::bail!("Config file not found: {}", path);
            }
            Some(path.to_string())
        } else {
            DEFAULT_PATHS.iter().find_map(|path| {
                let expanded_path = shellexpand::tilde(path);
                if Path::new(expanded_path.as_ref()).exists() {
                    Some(expanded_path.to_string())
                } else {
                    None
                }
            })
        };

        // If no config exists, create and save a default config
        let Some(path) = config_path_to_load else {
            let default_config = Self::default();

            let config_dir = dirs::home_dir()
                .map(|mut path| {
                    path.push(".config");
                    path.push("visor");
                    path
                })
                .unwrap_or_else(|| std::path::PathBuf::from("."));

            std::fs::create_dir_all(&config_dir).ok();

            let config_file = config_dir.join("config.toml");
            if let Some(config_file) = config_file.to_str() {
                if let Err(e) = default_config.save(config_file) {
                    eprintln!("Warning: Could not save default config: {}", e);
                } else {
                    println!("Created default configuration at: {}", config_file);
                }
            }

            return Ok(default_config);
        };

        let config_content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    pub fn load_with_overrides(
        config_path: Option<&str>,
        api_url_override: Option<String>,
        api_key_override: Option<String>,
        model_override: Option<String>,
        max_iterations_override: Option<u32>,
    ) -> Result<Self> {
        let mut config = Self::load(config_path)?;

        if let Some(api_url) = api_url_override {
            config.gateway.api_url = api_url;
        }
        if let Some(api_key) = api_key_override {
            config.gateway.api_key = api_key;
        }
        if let Some(model) = model_override {
            config.gateway.model = model;
        }
        if let Some(max_iterations) = max_iterations_override {
            config.agent.max_iterations = max_iterations;
        }

        Ok(config)
    }
}
