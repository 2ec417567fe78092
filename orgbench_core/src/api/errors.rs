use thiserror::Error;

/// Errors from the remote query API. Service messages are carried
/// verbatim; this client does not retry or classify them further.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    /// The service rejected the request and said why.
    #[error("{0}")]
    Service(String),
    /// Non-success status with no parseable service message.
    #[error("unexpected HTTP status {0}")]
    Http(u16),
    #[error("connected app is not configured; set client_id and client_secret in config.json")]
    MissingClientConfig,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}
