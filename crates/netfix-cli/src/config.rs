//! Configuration file support

use netfix_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Which episode store to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    #[default]
    File,
    Memory,
}

/// Configuration for netfix
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the webhook server binds to
    pub bind: String,
    /// Webhook URL to talk to instead of the in-process engine
    pub remote_url: Option<String>,
    /// Conversation id used by the console
    pub sender: String,
    /// Timeout for webhook requests
    pub request_timeout_secs: u64,
    /// Attempts allowed before escalating to a network admin
    pub max_attempts: u32,
    /// Upper bound on chained engine steps within one turn
    pub max_steps_per_turn: usize,
    /// Episode store backend
    pub store: StoreKind,
    /// Override for the data directory (conversations and transcripts)
    pub data_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            bind: "127.0.0.1:5005".to_string(),
            remote_url: None,
            sender: "voice_user".to_string(),
            request_timeout_secs: 30,
            max_attempts: engine.max_attempts,
            max_steps_per_turn: engine.max_steps_per_turn,
            store: StoreKind::File,
            data_dir: None,
        }
    }
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("netfix")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("NETFIX_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Directory holding conversations and transcripts
    pub fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("netfix"),
        }
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            max_attempts: self.max_attempts,
            max_steps_per_turn: self.max_steps_per_turn,
        }
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }
        Self::default().save()?;
        Ok(path)
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# netfix configuration file
# Place at ~/.config/netfix/config.toml (Linux/Mac) or %APPDATA%\netfix\config.toml (Windows)

# Address for `netfix --serve`
bind = "127.0.0.1:5005"

# Talk to a running webhook instead of the built-in engine (optional)
# remote_url = "http://localhost:5005/webhooks/rest/webhook"

# Conversation id used by the console
sender = "voice_user"

# Seconds before a webhook request is abandoned
request_timeout_secs = 30

# Failed instructions allowed before escalating
max_attempts = 2

# Safety bound on chained engine steps per turn
max_steps_per_turn = 16

# Episode store: "file" or "memory"
store = "file"

# data_dir = "~/.local/share/netfix"
"#
}
