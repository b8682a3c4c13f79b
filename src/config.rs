use crate::error::{ProxyError, Result};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://integrate.api.nvidia.com/v1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

pub const ENV_BASE_URL: &str = "NIM_API_BASE";
pub const ENV_API_KEY: &str = "NIM_API_KEY";
pub const ENV_PORT: &str = "PORT";
pub const ENV_TIMEOUT: &str = "NIM_TIMEOUT_SECS";

/// Process configuration, sourced from the environment only.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub port: u16,
    pub base_url: String,
    /// Missing keys are reported per request, not at startup.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ProxyConfig {
    /// Load config from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load config through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty(ENV_PORT) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                ProxyError::config(format!("Invalid {ENV_PORT} value '{raw}': {e}"))
            })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match non_empty(ENV_TIMEOUT) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                ProxyError::config(format!("Invalid {ENV_TIMEOUT} value '{raw}': {e}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            port,
            base_url: non_empty(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: non_empty(ENV_API_KEY),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The configured API key, or a configuration error naming the variable.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            ProxyError::config(format!(
                "{ENV_API_KEY} not configured. Please add your NVIDIA API key to the environment variables."
            ))
        })
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
