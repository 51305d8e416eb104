use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::common::constants::{
    DEFAULT_DETAIL_LIMIT, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_PORT, DEFAULT_USER_AGENT,
    NOMINATIM_SEARCH_URL,
};
use crate::common::error::{Result, ScraperError};

pub const CONFIG_PATH_ENV: &str = "CITY_EVENTS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Runtime settings. Precedence: defaults, then the TOML file, then env vars.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How many listings per call get a detail page fetch
    pub detail_limit: usize,
    pub port: u16,
    pub nominatim_url: String,
    pub user_agent: String,
    pub http_timeout_secs: u64,
    /// Reload a page this often while waiting for a selector; 0 disables
    pub reload_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            detail_limit: DEFAULT_DETAIL_LIMIT,
            port: DEFAULT_PORT,
            nominatim_url: NOMINATIM_SEARCH_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            reload_interval_ms: 0,
        }
    }
}

impl Config {
    /// Loads `.env`, the config file (if any) and the process environment.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let file = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                default.exists().then_some(default)
            }
        };

        Self::from_sources(file.as_deref(), |key| std::env::var(key).ok())
    }

    pub fn from_sources<F>(file: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match file {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    ScraperError::Config(format!(
                        "Failed to read config file '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                toml::from_str(&content)?
            }
            None => Config::default(),
        };

        if let Some(limit) = env_value::<usize>(&env, "EVENTBRITE_DETAIL_LIMIT")? {
            config.detail_limit = limit;
        }
        if let Some(port) = env_value::<u16>(&env, "PORT")? {
            config.port = port;
        }
        if let Some(url) = env("NOMINATIM_URL") {
            config.nominatim_url = url;
        }
        if let Some(agent) = env("SCRAPER_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(secs) = env_value::<u64>(&env, "HTTP_TIMEOUT_SECS")? {
            config.http_timeout_secs = secs;
        }
        if let Some(ms) = env_value::<u64>(&env, "RELOAD_INTERVAL_MS")? {
            config.reload_interval_ms = ms;
        }

        Ok(config)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn reload_interval(&self) -> Option<Duration> {
        (self.reload_interval_ms > 0).then(|| Duration::from_millis(self.reload_interval_ms))
    }
}

fn env_value<T>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ScraperError::Config(format!("{key}={raw:?} is invalid: {e}"))),
        None => Ok(None),
    }
}
