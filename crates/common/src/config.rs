//! Environment-driven configuration.
//!
//! Everything is read once at startup. A missing market-data key is not an
//! error: it switches the dashboard into mock-data mode.

use std::env;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_COINGECKO_BASE_URL: &str = "https://pro-api.coingecko.com/api/v3";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-latest";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_SIGNAL_POLL_SECS: u64 = 5 * 60;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be a boolean, got {value:?}")]
    InvalidFlag { key: &'static str, value: String },
    #[error("{url_key} is set but {token_key} is missing")]
    MissingToken {
        url_key: &'static str,
        token_key: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl MarketDataConfig {
    pub fn mock_mode(&self) -> bool {
        self.api_key.is_none()
    }
}

/// Credentials for an Upstash REST endpoint (Redis or Vector).
#[derive(Debug, Clone, PartialEq)]
pub struct RestStoreConfig {
    pub url: String,
    pub token: String,
    pub read_only_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantConfig {
    pub api_key: String,
    pub model: String,
    pub use_direct: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub market: MarketDataConfig,
    pub cache: Option<RestStoreConfig>,
    pub vector: Option<RestStoreConfig>,
    pub assistant: Option<AssistantConfig>,
    pub poll_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout_secs = parse_secs(
            get("HTTP_TIMEOUT_SECS"),
            "HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        let poll_secs = parse_secs(
            get("SIGNAL_POLL_SECS"),
            "SIGNAL_POLL_SECS",
            DEFAULT_SIGNAL_POLL_SECS,
        )?;

        let market = MarketDataConfig {
            api_key: get("COINGECKO_API_KEY"),
            base_url: get("COINGECKO_BASE_URL")
                .unwrap_or_else(|| DEFAULT_COINGECKO_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        let cache = match get("KV_REST_API_URL").or_else(|| get("KV_URL")) {
            Some(url) => Some(RestStoreConfig {
                url,
                token: get("KV_REST_API_TOKEN").ok_or(ConfigError::MissingToken {
                    url_key: "KV_REST_API_URL",
                    token_key: "KV_REST_API_TOKEN",
                })?,
                read_only_token: get("KV_REST_API_READ_ONLY_TOKEN"),
            }),
            None => None,
        };

        let vector = match get("UPSTASH_VECTOR_REST_URL") {
            Some(url) => Some(RestStoreConfig {
                url,
                token: get("UPSTASH_VECTOR_REST_TOKEN").ok_or(ConfigError::MissingToken {
                    url_key: "UPSTASH_VECTOR_REST_URL",
                    token_key: "UPSTASH_VECTOR_REST_TOKEN",
                })?,
                read_only_token: get("UPSTASH_VECTOR_REST_READONLY_TOKEN"),
            }),
            None => None,
        };

        let use_direct = parse_flag(get("USE_DIRECT_ANTHROPIC"), "USE_DIRECT_ANTHROPIC")?;
        let assistant = get("ANTHROPIC_API_KEY").map(|api_key| AssistantConfig {
            api_key,
            model: get("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            use_direct,
        });

        Ok(Self {
            market,
            cache,
            vector,
            assistant,
            poll_interval: Duration::from_secs(poll_secs),
        })
    }
}

fn parse_secs(value: Option<String>, key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::InvalidNumber { key, value: raw }),
        },
    }
}

fn parse_flag(value: Option<String>, key: &'static str) -> Result<bool, ConfigError> {
    let Some(raw) = value else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { key, value: raw }),
    }
}
