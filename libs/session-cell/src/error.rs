use thiserror::Error;

use patient_cell::PatientError;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Session store unavailable: {0}")]
    Unavailable(String),

    #[error("Session store command failed: {0}")]
    Command(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session {0} is already closed")]
    Closed(String),

    #[error(transparent)]
    Patient(#[from] PatientError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) => AppError::NotFound(err.to_string()),
            SessionError::Closed(_) => AppError::ValidationError(err.to_string()),
            SessionError::Patient(e) => e.into(),
            SessionError::Store(StoreError::Unavailable(msg)) => AppError::StorageUnavailable(msg),
            SessionError::Store(StoreError::Command(msg)) => AppError::Internal(msg),
            SessionError::Serialization(e) => AppError::Internal(e.to_string()),
        }
    }
}
