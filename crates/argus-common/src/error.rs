use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArgusError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Backend returned {status} for {path}")]
    Status { status: u16, path: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ArgusError>;

/// Form validation failures. The display text is shown to the operator as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter at least one keyword")]
    NoKeywords,

    #[error("Please select at least one search engine")]
    NoEngines,

    #[error("Unknown search engine: {0}")]
    UnknownEngine(String),
}
