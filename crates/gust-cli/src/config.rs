//! Configuration file support

use gust_stream::{DEFAULT_ENDPOINT, RunOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for gust
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Agent stream endpoint
    pub endpoint: Option<String>,
    /// Fixed thread id (a new one is generated per session otherwise)
    pub thread_id: Option<String>,
    /// Agent run parameters
    pub agent: AgentSettings,
}

/// Run parameters sent with every request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub run_id: Option<String>,
    pub resource_id: Option<String>,
    pub max_retries: Option<u32>,
    pub max_steps: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gust")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("GUST_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    fn parse(content: &str) -> Self {
        match toml::from_str(content) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: Failed to parse config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let defaults = RunOptions::default();
        let default_config = Config {
            endpoint: Some(DEFAULT_ENDPOINT.to_string()),
            thread_id: None,
            agent: AgentSettings {
                run_id: Some(defaults.run_id),
                resource_id: Some(defaults.resource_id),
                max_retries: Some(defaults.max_retries),
                max_steps: Some(defaults.max_steps),
                temperature: Some(defaults.temperature),
                top_p: Some(defaults.top_p),
            },
        };

        default_config.save()
    }

    /// Endpoint to use, falling back to the hosted agent
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    /// Run options with unset fields taken from the defaults
    pub fn run_options(&self) -> RunOptions {
        let defaults = RunOptions::default();
        let agent = &self.agent;
        RunOptions {
            run_id: agent.run_id.clone().unwrap_or(defaults.run_id),
            resource_id: agent.resource_id.clone().unwrap_or(defaults.resource_id),
            max_retries: agent.max_retries.unwrap_or(defaults.max_retries),
            max_steps: agent.max_steps.unwrap_or(defaults.max_steps),
            temperature: agent.temperature.unwrap_or(defaults.temperature),
            top_p: agent.top_p.unwrap_or(defaults.top_p),
            runtime_context: defaults.runtime_context,
        }
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# gust configuration file
# Place at ~/.config/gust/config.toml (Linux), ~/Library/Application Support/gust/config.toml (macOS)
# or %APPDATA%\gust\config.toml (Windows). Override with GUST_CONFIG_PATH.

# Agent stream endpoint
endpoint = "https://millions-screeching-vultur.mastra.cloud/api/agents/weatherAgent/stream"

# Fixed thread id (optional; a new thread is started every session otherwise)
# thread_id = "thread-1700000000000-abc123def"

[agent]
run_id = "weatherAgent"
resource_id = "weatherAgent"
max_retries = 2
max_steps = 5
temperature = 0.5
top_p = 1.0
"#
}
