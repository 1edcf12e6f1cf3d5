use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The identity provider rejected the credentials or could not be reached
    #[error("Authentication failed (HTTP {status}): {body}")]
    Authentication { status: u16, body: String },
    /// An authenticated request was refused, usually because the token expired
    #[error("Unauthorized (HTTP {status}) for {url}: access token rejected or expired")]
    Unauthorized { status: u16, url: String },
    /// A search was attempted without an area of interest or a date range
    #[error("Query precondition failed: {0}")]
    QueryPrecondition(String),
    /// The catalog returned an empty result set
    #[error("No products found for the given search filter")]
    NoResults,
    /// Non-success response from the catalog or the download endpoint
    #[error("HTTP {status} from {url}: {body}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },
    /// Network request failed before a response was received
    #[error("Network error: {0}")]
    Network(String),
    /// Archive could not be read or unpacked
    #[error("Extraction error: {0}")]
    Extraction(String),
    /// Failed to parse a server response or header
    #[error("Parse error: {0}")]
    Parse(String),
    /// Invalid input format
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(String),
}

// Conversion implementations for common errors
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::InvalidInput(format!("Invalid URL: {err}"))
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        AppError::InvalidInput(format!("Invalid date (expected YYYY-MM-DD): {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

// Custom type alias for Results in this application
pub type AppResult<T> = Result<T, AppError>;
