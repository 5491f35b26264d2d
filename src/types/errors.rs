use serde::{Deserialize, Serialize};
use thiserror::Error;

// === ErrorKind ===

/// Machine-readable failure category reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ValidationFailed,
    NotFound,
    Conflict,
    InvariantViolation,
    RateLimited,
    Internal,
}

impl ErrorKind {
    /// Returns the wire name of the kind, e.g. `"NOT_FOUND"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationFailed => "VALIDATION_FAILED",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::InvariantViolation => "INVARIANT_VIOLATION",
            ErrorKind::RateLimited => "RATE_LIMITED",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

// === StoreError ===

/// Errors raised by the bookmark store and its consistency rules.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed or missing required input.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
    /// A referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
    /// A uniqueness rule or revision check was violated.
    #[error("Conflict: {0}")]
    Conflict(String),
    /// The operation would break a structural invariant.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),
    /// Deriving a password hash failed.
    #[error("Password hashing failed: {0}")]
    PasswordHashing(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::ValidationFailed(_) => ErrorKind::ValidationFailed,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Conflict(_) => ErrorKind::Conflict,
            StoreError::InvariantViolation(_) => ErrorKind::InvariantViolation,
            StoreError::DatabaseError(_) | StoreError::PasswordHashing(_) => ErrorKind::Internal,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::SqliteFailure(err, msg)
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                StoreError::Conflict(
                    msg.clone()
                        .unwrap_or_else(|| "unique constraint failed".to_string()),
                )
            }
            _ => StoreError::DatabaseError(value.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// === SettingsError ===

/// Errors related to loading and saving service settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
