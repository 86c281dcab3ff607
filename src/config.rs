//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::constants::{
    DEFAULT_JUDGE_COUNT, DEFAULT_LOG_FORMAT, DEFAULT_NOTIFICATION_CHANNEL_CAPACITY,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, MAX_JUDGE_COUNT,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub judging: JudgingConfig,
    pub notifications: NotificationConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub log_format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue("LOG_FORMAT".to_string())),
        }
    }
}

/// Judging panel defaults for meets created over HTTP
#[derive(Debug, Clone)]
pub struct JudgingConfig {
    /// Panel size used when a create request omits it
    pub default_judge_count: usize,
    pub max_judge_count: usize,
}

/// Live notification configuration
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Buffer of the per-meet broadcast channel
    pub channel_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            judging: JudgingConfig::from_env()?,
            notifications: NotificationConfig::from_env()?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                rust_log: "info".to_string(),
                log_format: LogFormat::Pretty,
            },
            judging: JudgingConfig {
                default_judge_count: DEFAULT_JUDGE_COUNT,
                max_judge_count: MAX_JUDGE_COUNT,
            },
            notifications: NotificationConfig {
                channel_capacity: DEFAULT_NOTIFICATION_CHANNEL_CAPACITY,
            },
        }
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".to_string()))?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| DEFAULT_LOG_FORMAT.to_string())
                .parse()?,
        })
    }
}

impl JudgingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            default_judge_count: env::var("DEFAULT_JUDGE_COUNT")
                .unwrap_or_else(|_| DEFAULT_JUDGE_COUNT.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DEFAULT_JUDGE_COUNT".to_string()))?,
            max_judge_count: env::var("MAX_JUDGE_COUNT")
                .unwrap_or_else(|_| MAX_JUDGE_COUNT.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MAX_JUDGE_COUNT".to_string()))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// The engine cannot run panels larger than [`MAX_JUDGE_COUNT`]
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_judge_count == 0 || self.max_judge_count > MAX_JUDGE_COUNT {
            return Err(ConfigError::InvalidValue("MAX_JUDGE_COUNT".to_string()));
        }
        if self.default_judge_count == 0 || self.default_judge_count > self.max_judge_count {
            return Err(ConfigError::InvalidValue("DEFAULT_JUDGE_COUNT".to_string()));
        }
        Ok(())
    }
}

impl NotificationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let channel_capacity = env::var("NOTIFICATION_CHANNEL_CAPACITY")
            .unwrap_or_else(|_| DEFAULT_NOTIFICATION_CHANNEL_CAPACITY.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("NOTIFICATION_CHANNEL_CAPACITY".to_string()))?;
        // tokio's broadcast channel panics on zero capacity
        if channel_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "NOTIFICATION_CHANNEL_CAPACITY".to_string(),
            ));
        }
        Ok(Self { channel_capacity })
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
