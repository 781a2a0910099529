// src/config.rs
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub scraping: ScrapingConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScrapingConfig {
    pub rate_limit_delay_ms: u64,
    pub request_timeout_seconds: u64,
    pub max_retries: u32,
    pub max_parallel_sources: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub pretty_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scraping: ScrapingConfig {
                rate_limit_delay_ms: 1000,
                request_timeout_seconds: 30,
                max_retries: 2,
                max_parallel_sources: 5,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            output: OutputConfig { pretty_json: true },
        }
    }
}

pub async fn load_config(path: &str) -> Result<Config> {
    let content = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&content)
        .map_err(|e| crate::error::Error::Config(format!("{}: {}", path, e)))?;
    Ok(config)
}

/// API keys for the third-party contact-enrichment services. Read once at
/// startup and passed into the adapter registry, never consulted as ambient
/// state by adapters.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub hunter_io: Option<String>,
    pub clearbit: Option<String>,
    pub apollo_io: Option<String>,
    pub zoominfo: Option<String>,
}

impl ApiKeys {
    pub fn from_env() -> Self {
        Self {
            hunter_io: non_empty_env("HUNTER_IO_API_KEY"),
            clearbit: non_empty_env("CLEARBIT_API_KEY"),
            apollo_io: non_empty_env("APOLLO_IO_API_KEY"),
            zoominfo: non_empty_env("ZOOMINFO_API_KEY"),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Proxy pool for outbound requests: `proxies.txt` next to the binary if it
/// exists, otherwise the newline-delimited `PROXY_LIST` env var.
pub async fn load_proxies() -> Vec<String> {
    if let Ok(content) = tokio::fs::read_to_string("proxies.txt").await {
        return parse_proxy_list(&content);
    }
    match std::env::var("PROXY_LIST") {
        Ok(content) => parse_proxy_list(&content),
        Err(_) => Vec::new(),
    }
}

pub fn parse_proxy_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
