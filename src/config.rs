use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow, Context};

pub const APP_DIR: &str = "assistant-chat";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const API_URL_ENV: &str = "ASSISTANT_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub health_interval_secs: u64,
    pub history_limit: usize,
    pub toast_millis: u64,
    /// Recognizer command line, e.g. `["whisper-listen", "--once"]`.
    /// Voice input is unsupported when this is unset.
    pub speech_command: Option<Vec<String>>,
    pub quick_prompts: Vec<String>,
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            health_interval_secs: 30,
            history_limit: 10,
            toast_millis: 3000,
            speech_command: None,
            quick_prompts: vec![
                "What can you help me with?".to_string(),
                "Tell me a joke".to_string(),
                "What's the weather like today?".to_string(),
                "Give me a quick productivity tip".to_string(),
            ],
            log_filter: None,
        }
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Environment overrides sit between the config file and CLI flags.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
    }

    pub fn health_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.health_interval_secs.max(1))
    }

    pub fn toast_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.toast_millis)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join(APP_DIR))
    }

    pub fn default_log_path() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .or_else(dirs::config_dir)
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;

        Ok(data_dir.join(APP_DIR).join("assistant-chat.log"))
    }
}
