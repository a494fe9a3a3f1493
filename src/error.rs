use thiserror::Error;

/// Main error type for the search engine
#[derive(Error, Debug)]
pub enum SearchError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// HTTP request errors
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Provider errors
    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    /// Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Malformed caller input (e.g. a non-numeric app id)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl SearchError {
    pub(crate) fn provider(provider: &str, message: impl Into<String>) -> Self {
        SearchError::Provider {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

impl From<String> for SearchError {
    fn from(s: String) -> Self {
        SearchError::Other(s)
    }
}

impl From<&str> for SearchError {
    fn from(s: &str) -> Self {
        SearchError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SearchError>;
