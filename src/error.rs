use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the download service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with {0}")]
    Status(StatusCode),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Rejected(String),

    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("server url cannot carry a path: {0}")]
    CannotBeABase(String),
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Please select a format")]
    MissingFormat,

    #[error(transparent)]
    Client(#[from] ClientError),
}
