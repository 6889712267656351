use anyhow::{anyhow, Context, Result};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Required for live fetches, unused with `--fixtures`.
    pub api_key: Option<String>,
    pub rate_limit_per_minute: usize,
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api_key: lookup("ALPHAVANTAGE_API_KEY").filter(|k| !k.trim().is_empty()),
            rate_limit_per_minute: lookup("ALPHAVANTAGE_RATE_LIMIT")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .context("ALPHAVANTAGE_RATE_LIMIT must be a whole number of requests per minute")?,
            timeout_secs: lookup("ALPHAVANTAGE_TIMEOUT_SECS")
                .unwrap_or_else(|| "30".to_string())
                .parse()
                .context("ALPHAVANTAGE_TIMEOUT_SECS must be a whole number of seconds")?,
        })
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| anyhow!("ALPHAVANTAGE_API_KEY is not set (or pass --fixtures DIR)"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
