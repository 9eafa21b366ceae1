//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::listen::ListenConfig;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_ENV: &str = "CHATD_CONFIG";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid port argument: {0:?}")]
    InvalidPort(String),
}

/// Server configuration.
///
/// Every section is optional; an empty file yields [`Config::default`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Network listen configuration.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Chat engine settings.
    #[serde(default)]
    pub chat: ChatConfig,
    /// Prometheus endpoint settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from the file named by `CHATD_CONFIG`, or fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    /// Apply the optional positional port argument.
    pub fn apply_port_arg(&mut self, arg: Option<&str>) -> Result<(), ConfigError> {
        if let Some(raw) = arg {
            self.listen.port = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.to_string()))?;
        }
        Ok(())
    }
}

/// Chat engine settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ChatConfig {
    /// Room joined when a login frame names none (default: "public").
    #[serde(default = "default_room")]
    pub default_room: String,
    /// Capacity of each session's outbound queue (default: 256).
    /// A peer whose queue is full misses frames instead of stalling senders.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
    /// Largest accepted WebSocket frame, in bytes (default: 64 KiB).
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_room: default_room(),
            outbound_queue: default_outbound_queue(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

fn default_room() -> String {
    "public".to_string()
}

fn default_outbound_queue() -> usize {
    256
}

fn default_max_frame_bytes() -> usize {
    64 * 1024
}

/// Prometheus `/metrics` endpoint configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Serve `/metrics` on the chat port (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}
