//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development.

use crate::models::summary::MAX_PAGE_LIMIT;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which `HealthDataGateway` implementation to build at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMode {
    /// Real REST backend over HTTP.
    Http,
    /// In-memory fixtures (offline demos and tests).
    Fixture,
}

impl FromStr for GatewayMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(GatewayMode::Http),
            "fixture" | "mock" => Ok(GatewayMode::Fixture),
            _ => Err(ConfigError::Invalid("GATEWAY_MODE", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST backend (without `/api/v1`)
    pub api_url: String,
    /// Admin API key, sent as `X-Open-Wearables-API-Key`
    pub api_key: Option<String>,
    /// Session token, sent as a bearer token
    pub session_token: Option<String>,
    /// Per-request deadline
    pub request_timeout: Duration,
    /// Extra attempts after a retryable failure
    pub max_retries: u32,
    /// Linear backoff step between retries
    pub retry_backoff: Duration,
    /// Delay between two status polls
    pub poll_interval: Duration,
    /// Default page size for summary queries
    pub page_limit: u32,
    pub gateway_mode: GatewayMode,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            api_key: Some("test_api_key".to_string()),
            session_token: None,
            request_timeout: Duration::from_secs(5),
            max_retries: 2,
            retry_backoff: Duration::from_millis(1),
            poll_interval: Duration::from_millis(5),
            page_limit: 50,
            gateway_mode: GatewayMode::Fixture,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_url = env::var("WEARABLES_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .map_err(|_| ConfigError::Missing("WEARABLES_API_URL"))?;

        Ok(Self {
            api_url,
            api_key: optional_secret("WEARABLES_API_KEY"),
            session_token: optional_secret("WEARABLES_SESSION_TOKEN"),
            request_timeout: Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", 30)?),
            max_retries: parse_or("REQUEST_MAX_RETRIES", 3)?,
            retry_backoff: Duration::from_millis(parse_or("RETRY_BACKOFF_MS", 1000)?),
            poll_interval: Duration::from_secs(parse_or("POLL_INTERVAL_SECS", 5)?),
            page_limit: check_page_limit(parse_or("PAGE_LIMIT", 50)?)?,
            gateway_mode: env::var("GATEWAY_MODE")
                .ok()
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(GatewayMode::Http),
        })
    }
}

/// Read an optional secret, treating blank values as unset.
fn optional_secret(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Page size must be one the backend accepts.
fn check_page_limit(limit: u32) -> Result<u32, ConfigError> {
    if (1..=MAX_PAGE_LIMIT).contains(&limit) {
        Ok(limit)
    } else {
        Err(ConfigError::Invalid("PAGE_LIMIT", limit.to_string()))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

impl From<ConfigError> for crate::error::AppError {
    fn from(err: ConfigError) -> Self {
        crate::error::AppError::Config(err.to_string())
    }
}
