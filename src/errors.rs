use thiserror::Error;

use crate::purchase::RecordId;
use crate::validation::FieldErrors;

/// Failures raised while talking to the purchase collection endpoint.
///
/// The remote contract defines no error codes, so every non-success answer is
/// reported uniformly through [`ClientError::Status`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("HTTP client could not be built: {0}")]
    Build(String),
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("Server answered with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Could not decode server response: {0}")]
    Decode(String),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Error type for configuration loading and persistence.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors surfaced by the purchase service to the presentation layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid purchase: {0}")]
    Validation(FieldErrors),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("Purchase {0} not found")]
    NotFound(RecordId),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
