use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<url::ParseError> for ScanError {
    fn from(err: url::ParseError) -> Self {
        ScanError::InvalidUrl(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
