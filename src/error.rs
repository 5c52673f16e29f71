use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Duplicate payment: an identical request was seen within the duplicate window")]
    DuplicatePaymentError,
    #[error("Authorization backend error: {0}")]
    AuthorizationBackendError(#[from] AuthorizationFailure),
    #[error("Persistence error: {0}")]
    PersistenceError(#[from] StoreError),
    #[error("Payment {0} not found")]
    NotFoundError(Uuid),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Ways an exchange with the authorization backend can fail.
#[derive(Error, Debug)]
pub enum AuthorizationFailure {
    #[error("backend unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),
    #[error("backend returned non-success status {0}")]
    Status(u16),
    #[error("backend response could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for AuthorizationFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err)
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("payment {0} already exists")]
    AlreadyExists(Uuid),
    #[error("storage backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for StoreError {
    fn from(err: rocksdb::Error) -> Self {
        Self::Backend(Box::new(err))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Backend(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, PaymentError>;
