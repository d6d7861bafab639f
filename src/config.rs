//! Configuration loading and management

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime configuration for the storefront API
///
/// Everything has a sensible default; values can come from the environment
/// (`PORT`, `CACHE_TTL_MS`, `FETCH_TIMEOUT_MS`) or from a YAML file named
/// by `CONFIG_FILE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// TCP port to listen on
    pub port: u16,

    /// Time-to-live for the product/category cache, in milliseconds
    pub cache_ttl_ms: u64,

    /// Bounded timeout for store fetches on a cache miss, in milliseconds
    pub fetch_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 2000,
            cache_ttl_ms: 30_000,
            fetch_timeout_ms: 5_000,
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(port) = env_parse("PORT") {
            config.port = port;
        }
        if let Some(ttl) = env_parse("CACHE_TTL_MS") {
            config.cache_ttl_ms = ttl;
        }
        if let Some(timeout) = env_parse("FETCH_TIMEOUT_MS") {
            config.fetch_timeout_ms = timeout;
        }
        config
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
