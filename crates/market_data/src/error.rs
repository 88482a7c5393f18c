use serde_json::Value;
use thiserror::Error;
use tracing::error;

/// Failures of a market-data request. The `Display` text of every variant
/// is what the dashboard shows to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    #[error("Request timed out. Please try again.")]
    Timeout,
    #[error("Network error. Please check your connection.")]
    Network,
    #[error("API key is missing or invalid. Please check your COINGECKO_API_KEY.")]
    Unauthorized,
    #[error("API key invalid or expired.")]
    Forbidden,
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,
    #[error("Resource not found.")]
    NotFound,
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("Invalid API response format")]
    InvalidFormat,
    #[error("COINGECKO_API_KEY is not set")]
    MissingApiKey,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl MarketDataError {
    /// Classifies a request that never produced an HTTP response.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        error!("Market data request failed: {}", err);
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidFormat
        } else {
            Self::Network
        }
    }

    /// Classifies a non-success HTTP status, reading the `error` field of
    /// the body for statuses without a dedicated message.
    pub fn from_status(status: u16, body: &str) -> Self {
        let err = match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            _ => Self::Api {
                status,
                message: body_error(body)
                    .unwrap_or_else(|| format!("Request failed with status code {status}")),
            },
        };
        error!("Market data API error ({}): {}", status, err);
        err
    }

    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

fn body_error(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::String(msg) if !msg.trim().is_empty() => Some(msg.clone()),
        Value::Object(obj) => obj
            .get("error_message")
            .or_else(|| obj.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}
