use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("ANTHROPIC_API_KEY is not set")]
    MissingApiKey,
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("LLM request timed out")]
    Timeout,
    #[error("LLM returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("LLM response has no text content")]
    MissingContent,
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid trade analysis: {0}")]
    InvalidAnalysis(String),
    #[error("market context unavailable: {0}")]
    Context(String),
}
