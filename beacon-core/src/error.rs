use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeaconError {
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Certificate check failed: {0}")]
    CertificateError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BeaconError>;
