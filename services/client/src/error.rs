//! services/client/src/error.rs
//!
//! Defines the primary error type for the entire client service.

use crate::config::ConfigError;
use tastebook_core::ports::StoreError;

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the store ports.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Sign-in failed. Deliberately silent about which field was wrong.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// An action that needs an authenticated session, or an edit/delete on a
    /// record the current user does not own.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A required field was missing or malformed before any request was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents a standard Input/Output error from the local store.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted document failed to encode or decode.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
