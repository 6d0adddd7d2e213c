use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;
use tracing::{info, warn};

use crate::chat::ReplyDelays;

// Import logging macros
use crate::{log_system_event, log_validation};

pub const MEMORY_STORAGE: &str = "memory";

/// Complete application configuration loaded from environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub chat: ChatConfig,
}

/// Where the key-value store lives: a SQLite URL or `memory`
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_enabled: bool,
    pub console_enabled: bool,
    pub log_directory: String,
}

/// Delays before simulated chat replies
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    pub tutor_reply_delay_ms: u64,
    pub buddy_reply_delay_ms: u64,
}

impl Config {
    /// Read the environment. Nothing is logged here since the subscriber
    /// is built from this config; call [`Config::log_configuration_summary`]
    /// once logging is up.
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            storage: StorageConfig::from_env()?,
            server: ServerConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
            chat: ChatConfig::from_env()?,
        })
    }

    pub fn log_configuration_summary(&self) {
        log_system_event!(config, "Configuration loaded from environment variables");
        info!(
            storage_url = %self.storage.url,
            server_address = %format!("{}:{}", self.server.host, self.server.port),
            log_level = %self.logging.level,
            tutor_reply_delay_ms = self.chat.tutor_reply_delay_ms,
            buddy_reply_delay_ms = self.chat.buddy_reply_delay_ms,
            "Configuration summary"
        );
    }

    pub fn validate(&self) -> Result<()> {
        if !self.storage.is_memory() && !self.storage.url.starts_with("sqlite:") {
            return Err(anyhow!("STORAGE_URL must start with 'sqlite:' or be 'memory'"));
        }

        if self.server.port == 0 {
            return Err(anyhow!("Server port must be greater than 0"));
        }

        if !["trace", "debug", "info", "warn", "error"]
            .iter()
            .any(|level| self.logging.level.to_lowercase().starts_with(level))
        {
            warn!("Unrecognised log level '{}', using 'info' as fallback", self.logging.level);
        }

        log_validation!(success, "configuration", "Configuration validation completed successfully");
        Ok(())
    }
}

impl StorageConfig {
    fn from_env() -> Result<Self> {
        let url = env::var("STORAGE_URL").unwrap_or_else(|_| "sqlite:tutor_hub.db".to_string());
        Ok(StorageConfig { url })
    }

    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_STORAGE
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self> {
        let port_str = env::var("PORT").unwrap_or_else(|_| "3000".to_string());

        let port = port_str.parse::<u16>().map_err(|_| {
            anyhow!("Invalid PORT value: '{}'. Must be a number between 1-65535", port_str)
        })?;

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        Ok(ServerConfig { port, host })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl LoggingConfig {
    fn from_env() -> Result<Self> {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info,tutor_hub=debug".to_string());

        let file_enabled = env::var("LOG_FILE_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let console_enabled = env::var("LOG_CONSOLE_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let log_directory = env::var("LOG_DIRECTORY").unwrap_or_else(|_| "logs".to_string());

        Ok(LoggingConfig {
            level,
            file_enabled,
            console_enabled,
            log_directory,
        })
    }
}

impl ChatConfig {
    fn from_env() -> Result<Self> {
        Ok(ChatConfig {
            tutor_reply_delay_ms: delay_from_env("TUTOR_REPLY_DELAY_MS", 500)?,
            buddy_reply_delay_ms: delay_from_env("BUDDY_REPLY_DELAY_MS", 600)?,
        })
    }

    pub fn reply_delays(&self) -> ReplyDelays {
        ReplyDelays {
            tutor: Duration::from_millis(self.tutor_reply_delay_ms),
            buddy: Duration::from_millis(self.buddy_reply_delay_ms),
        }
    }
}

fn delay_from_env(name: &str, default_ms: u64) -> Result<u64> {
    match env::var(name) {
        Ok(value) => value
            .parse::<u64>()
            .map_err(|_| anyhow!("Invalid {} value: '{}'. Must be milliseconds", name, value)),
        Err(_) => Ok(default_ms),
    }
}
