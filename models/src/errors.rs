// models/src/errors.rs

use std::io;
pub use thiserror::Error;
use serde_json::Error as SerdeJsonError;

/// Pre-persistence validation failures. These are caught before any gateway
/// call is issued.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required field is missing: {0}")]
    MissingField(&'static str),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("logo exceeds the 5 MiB limit ({0} bytes)")]
    LogoTooLarge(usize),
    #[error("logo must be a PNG or JPEG image")]
    LogoBadFormat,
}

/// Authentication refusals, distinguished so the API layer can report each
/// case with its own message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("duplicate account - contact administration")]
    DuplicateAccount,
    #[error("account deactivated")]
    AccountDeactivated,
    #[error("session token invalid or expired: {0}")]
    TokenInvalid(String),
}

#[derive(Debug, Error)]
pub enum HostelError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("conflict: {0}")]
    Conflict(String), // Business-rule refusal, nothing persisted
    #[error("gateway error: {0}")]
    Gateway(String), // Any failure surfaced by the persistence layer
    #[error("generation error: {0}")]
    Generation(String), // Text-generation failure
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Auth(#[from] AuthFailure),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[cfg(feature = "sled-errors")]
    #[error(transparent)]
    Sled(#[from] sled::Error),
}

impl From<SerdeJsonError> for HostelError {
    fn from(err: SerdeJsonError) -> Self {
        HostelError::Gateway(format!("JSON processing error: {}", err))
    }
}

impl From<bcrypt::BcryptError> for HostelError {
    fn from(err: bcrypt::BcryptError) -> Self {
        HostelError::Gateway(format!("password hashing error: {}", err))
    }
}
