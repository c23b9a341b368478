//! Client configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no file)
//! gives a client for `http://localhost:9200`. `PUPPY_ELASTIC_URL` overrides
//! the configured URL.

use crate::error::{ElasticError, Result};
use crate::units::TimeUnit;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const URL_ENV: &str = "PUPPY_ELASTIC_URL";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Upper bound for one blocking call, including cancellation
    #[serde(default = "default_sync_timeout_ms")]
    pub sync_timeout_ms: u64,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub scroll: ScrollSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_sync_timeout_ms() -> u64 {
    60_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            sync_timeout_ms: default_sync_timeout_ms(),
            username: None,
            password: None,
            scroll: ScrollSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScrollSettings {
    /// Engine time notation, e.g. `1m`
    #[serde(default = "default_scroll_lifetime")]
    pub lifetime: String,
    #[serde(default = "default_scroll_size")]
    pub size: u32,
    /// Open scrolls with `search_type=scan`
    #[serde(default)]
    pub scan: bool,
}

fn default_scroll_lifetime() -> String {
    "1m".to_string()
}

fn default_scroll_size() -> u32 {
    100
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            lifetime: default_scroll_lifetime(),
            size: default_scroll_size(),
            scan: false,
        }
    }
}

impl ScrollSettings {
    pub fn lifetime(&self) -> Result<TimeUnit> {
        TimeUnit::parse(&self.lifetime).ok_or_else(|| {
            ElasticError::Config(format!("invalid scroll lifetime: {}", self.lifetime))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log output format: "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info,puppy_elastic=debug".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ClientConfig {
    /// Config pointing at `url`, defaults otherwise
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, defaults otherwise, then apply the
    /// environment override.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            Self::from_toml_str(&content)?
        } else {
            ClientConfig::default()
        };

        if let Ok(url) = std::env::var(URL_ENV) {
            if !url.is_empty() {
                config.url = url;
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.url)?;
        self.scroll.lifetime()?;
        if self.scroll.size == 0 {
            return Err(ElasticError::Config("scroll size must be > 0".to_string()));
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_timeout_ms)
    }
}
