//! Application configuration management.
//!
//! This module handles loading the application configuration, which holds
//! the API base URL and the knobs for the request cache.
//!
//! Configuration is stored at `~/.config/orderdash/config.json` and can be
//! overridden from the environment (`API_BASE_URL`,
//! `ORDERDASH_REQUEST_TIMEOUT_SECS`).

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "orderdash";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Persisted user session file name
const USER_SESSION_FILE: &str = "user_session.json";

/// Directory holding browsing-session cache entries
const SESSION_CACHE_DIR: &str = "session";

/// Environment variable carrying the API base URL
pub const BASE_URL_ENV: &str = "API_BASE_URL";

/// Environment variable overriding the request timeout
pub const TIMEOUT_ENV: &str = "ORDERDASH_REQUEST_TIMEOUT_SECS";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Base URL of the dashboard API.
///
/// Read once at startup. Only surrounding whitespace is trimmed; trailing
/// slashes and the like are kept verbatim because cache keys are built by
/// plain concatenation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseUrl(String);

impl BaseUrl {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let trimmed = url.trim();
        if trimmed.is_empty() {
            anyhow::bail!("API base URL must not be empty");
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub base_url: Option<String>,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Share one network request between concurrent fetches of the same key.
    #[serde(default = "default_coalesce")]
    pub coalesce_in_flight: bool,
    /// Overrides the browsing-session storage directory.
    pub session_dir: Option<PathBuf>,
}

fn default_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_coalesce() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            coalesce_in_flight: true,
            session_dir: None,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(BASE_URL_ENV) {
            self.base_url = Some(url);
        }
        if let Some(timeout) = lookup(TIMEOUT_ENV) {
            self.request_timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of seconds", TIMEOUT_ENV))?;
        }
        Ok(())
    }

    /// The configured base URL, required by every network component.
    pub fn base_url(&self) -> Result<BaseUrl> {
        let url = self
            .base_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("No API base URL configured (set {})", BASE_URL_ENV))?;
        BaseUrl::new(url)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    fn app_cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Directory scoped to the current browsing session.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match self.session_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => Ok(Self::app_cache_dir()?.join(SESSION_CACHE_DIR)),
        }
    }

    /// Location of the persisted user session record.
    pub fn user_session_path(&self) -> Result<PathBuf> {
        Ok(Self::app_cache_dir()?.join(USER_SESSION_FILE))
    }
}
