use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::DEFAULT_TOP_K;

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8787";

/// Environment variable overriding `service.base_url`.
pub const SERVICE_URL_ENV: &str = "OBRIDGE_SERVICE_URL";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub readiness: ReadinessConfig,
    #[serde(default)]
    pub outline: OutlineConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            top_k: default_top_k(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}
fn default_top_k() -> usize {
    DEFAULT_TOP_K
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReadinessConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_interval_ms() -> u64 {
    100
}
fn default_max_attempts() -> u32 {
    100
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OutlineConfig {
    /// Directory searched when a page is given by name rather than path.
    #[serde(default)]
    pub graph_dir: Option<PathBuf>,
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Apply `OBRIDGE_SERVICE_URL` and an optional CLI override, in that order.
    pub fn with_overrides(mut self, service_url: Option<&str>) -> Self {
        if let Ok(url) = std::env::var(SERVICE_URL_ENV) {
            self.service.base_url = normalize_base_url(&url);
        }
        if let Some(url) = service_url {
            self.service.base_url = normalize_base_url(url);
        }
        self
    }
}

/// Strip trailing slashes; blank input falls back to the default URL.
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_SERVICE_URL.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.service.base_url = normalize_base_url(&config.service.base_url);

    validate(&config)?;
    Ok(config)
}

/// Load `path`, or fall back to [`Config::minimal`] when the file is absent
/// and was not explicitly requested.
pub fn load_or_minimal(path: &Path, explicit: bool) -> Result<Config> {
    if !explicit && !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::minimal());
    }
    load_config(path)
}

pub fn validate(config: &Config) -> Result<()> {
    let url = &config.service.base_url;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("service.base_url must start with http:// or https:// (got '{}')", url);
    }

    if config.service.top_k == 0 {
        bail!("service.top_k must be >= 1");
    }

    if config.service.timeout_secs == 0 {
        bail!("service.timeout_secs must be > 0");
    }

    if config.readiness.max_attempts == 0 {
        bail!("readiness.max_attempts must be >= 1");
    }

    Ok(())
}
