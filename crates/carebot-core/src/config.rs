//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Paths to all CareBot data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// SQLite database file (`data/carebot.db`).
    pub database: PathBuf,
    /// LLM configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            database: root.join("carebot.db"),
            llm_config_file: root.join("llm-config.json"),
            root,
        })
    }
}

/// Twilio account credentials for outbound WhatsApp messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioCredentials {
    pub account_sid: String,
    #[serde(skip_serializing)]
    pub auth_token: String,
    /// Sender number, with or without the `whatsapp:` prefix.
    pub phone_number: String,
}

/// Per-user sliding window limits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_calls: usize,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls: 10,
            window: Duration::from_secs(60),
        }
    }
}

/// Top-level CareBot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareBotConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Incoming messages longer than this are truncated.
    pub max_message_length: usize,
    pub rate_limit: RateLimitConfig,
    /// Messages and analyses older than this many days are purged.
    pub retention_days: u32,
    /// `None` unless all three Twilio variables are set.
    pub twilio: Option<TwilioCredentials>,
}

impl CareBotConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_lookup(data_dir, |key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source.
    pub fn from_lookup<F>(data_dir: impl AsRef<Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or(&lookup, "PORT", 5000u16)?;
        let max_message_length = parse_or(&lookup, "MAX_MESSAGE_LENGTH", 1000usize)?;
        let max_calls = parse_or(&lookup, "RATE_LIMIT_MAX_CALLS", 10usize)?;
        let window_secs = parse_or(&lookup, "RATE_LIMIT_WINDOW_SECS", 60u64)?;
        let retention_days = parse_or(&lookup, "DATA_RETENTION_DAYS", 90u32)?;
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let twilio = match (
            lookup("TWILIO_ACCOUNT_SID"),
            lookup("TWILIO_AUTH_TOKEN"),
            lookup("TWILIO_PHONE_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(phone_number)) => Some(TwilioCredentials {
                account_sid,
                auth_token,
                phone_number,
            }),
            _ => {
                tracing::warn!("Twilio credentials incomplete; outbound messages disabled");
                None
            }
        };

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            data_paths,
            log_level,
            max_message_length,
            rate_limit: RateLimitConfig {
                max_calls,
                window: Duration::from_secs(window_secs),
            },
            retention_days,
            twilio,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value: {:?}", key, raw))),
        None => Ok(default),
    }
}
