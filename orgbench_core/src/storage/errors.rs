use thiserror::Error;

/// Errors from the environment list file and the provider on top of it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed environment list: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unable to locate a config directory")]
    NoConfigDir,
    #[error("an environment named '{0}' already exists")]
    DuplicateName(String),
    #[error("no environment named '{0}'")]
    UnknownName(String),
    #[error(transparent)]
    Secret(#[from] SecretError),
}

/// Errors from the secret backend.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret not found")]
    NotFound,
    #[error("secret storage: {0}")]
    Backend(String),
}

impl From<keyring::Error> for SecretError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoEntry => SecretError::NotFound,
            other => SecretError::Backend(other.to_string()),
        }
    }
}
