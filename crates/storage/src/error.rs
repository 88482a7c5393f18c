use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("cache store rejected command: {0}")]
    Store(String),
    #[error("cache payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid cache url: {0}")]
    Url(#[from] url::ParseError),
    #[error("unexpected reply to {command}: {reply}")]
    UnexpectedReply { command: &'static str, reply: String },
}

#[derive(Error, Debug)]
pub enum VectorError {
    #[error("vector request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("vector store rejected request: {0}")]
    Store(String),
    #[error("vector payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid vector store url: {0}")]
    Url(#[from] url::ParseError),
    #[error("index {index} holds {expected}-dimensional vectors, got {got}")]
    DimensionMismatch {
        index: String,
        expected: usize,
        got: usize,
    },
    #[error("vectors must not be empty")]
    EmptyVector,
}
