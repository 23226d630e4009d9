use thiserror::Error;

/// SQLSTATE raised by an exclusion constraint (overlapping ranges).
pub const EXCLUSION_VIOLATION: &str = "23P01";
/// SQLSTATE raised by a unique index.
pub const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Constraint violation ({code}): {message}")]
    Constraint { code: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl DbError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DbError::Unavailable(_))
    }

    pub fn is_exclusion_violation(&self) -> bool {
        matches!(self, DbError::Constraint { code, .. } if code == EXCLUSION_VIOLATION)
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::Constraint { code, .. } if code == UNIQUE_VIOLATION)
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Decode(err.to_string())
    }
}
