//! # AppError
//!
//! Centralized error handling for the Ophir Estate services.
//! Every port returns these, and the API layer maps each variant to one
//! HTTP status.

use thiserror::Error;

/// The primary error type for all ophir-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed input (e.g., empty contact field, bad email)
    #[error("validation error: {0}")]
    Validation(String),

    /// No session, or the session cookie is malformed/expired
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Valid session, insufficient role
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (e.g., unknown credential email)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// The hosted backend or object store failed the call
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Anything else (serialization bugs, misconfiguration)
    #[error("internal service error: {0}")]
    Internal(String),
}

/// Why a session cookie was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("malformed session token")]
    Malformed,

    #[error("session expired")]
    Expired,
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

/// A specialized Result type for Ophir Estate logic.
pub type Result<T> = std::result::Result<T, AppError>;
