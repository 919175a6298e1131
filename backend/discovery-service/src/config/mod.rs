use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

/// Connection settings for the hosted catalog backend (PostgREST API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_catalog_timeout_ms")]
    pub timeout_ms: u64,
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Tuning knobs for the trending computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// How many recent public items are fetched per pass
    #[serde(default = "default_fetch_window")]
    pub fetch_window: usize,
    /// How many ranked items are returned
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Exclusive upper bound of the random views jitter (0 disables it)
    #[serde(default = "default_views_jitter_max")]
    pub views_jitter_max: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            fetch_window: default_fetch_window(),
            top_n: default_top_n(),
            views_jitter_max: default_views_jitter_max(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            app: AppConfig {
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("APP_PORT", 8080)?,
                log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            catalog: CatalogConfig {
                base_url: std::env::var("CATALOG_URL")
                    .map_err(|_| AppError::Config("CATALOG_URL must be set".to_string()))?
                    .trim_end_matches('/')
                    .to_string(),
                api_key: std::env::var("CATALOG_API_KEY")
                    .map_err(|_| AppError::Config("CATALOG_API_KEY must be set".to_string()))?,
                timeout_ms: parse_var("CATALOG_TIMEOUT_MS", default_catalog_timeout_ms())?,
            },
            discovery: DiscoveryConfig {
                fetch_window: parse_var("DISCOVERY_FETCH_WINDOW", default_fetch_window())?,
                top_n: parse_var("DISCOVERY_TOP_N", default_top_n())?,
                views_jitter_max: parse_var(
                    "DISCOVERY_VIEWS_JITTER_MAX",
                    default_views_jitter_max(),
                )?,
            },
        })
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{} is invalid: {}", key, e))),
        Err(_) => Ok(default),
    }
}

fn default_catalog_timeout_ms() -> u64 {
    5_000
}

fn default_fetch_window() -> usize {
    100
}

fn default_top_n() -> usize {
    8
}

fn default_views_jitter_max() -> u64 {
    50
}
