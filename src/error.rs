//! Error types for the Kopis library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`KopisError`] enum. The variants follow the load-time error policy: a
//! `Store` error is fatal to `open`, a `Snapshot` error is recovered locally
//! by rebuilding the affected artifact, and `Lookup` errors surface "not
//! found where presence was assumed" to the caller.

use std::io;

use thiserror::Error;

/// The main error type for Kopis operations.
#[derive(Error, Debug)]
pub enum KopisError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Backing store unreachable or malformed schema. Fatal during open.
    #[error("Store error: {0}")]
    Store(String),

    /// Corrupt or unreadable snapshot artifact. Recovered by rebuilding.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Unknown type code or missing id where the caller assumed presence.
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with KopisError.
pub type Result<T> = std::result::Result<T, KopisError>;

impl KopisError {
    /// Create a new store error.
    pub fn store<S: Into<String>>(msg: S) -> Self {
        KopisError::Store(msg.into())
    }

    /// Create a new snapshot error.
    pub fn snapshot<S: Into<String>>(msg: S) -> Self {
        KopisError::Snapshot(msg.into())
    }

    /// Create a new lookup error.
    pub fn lookup<S: Into<String>>(msg: S) -> Self {
        KopisError::Lookup(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        KopisError::SerializationError(msg.into())
    }

    /// Create a new invalid operation error.
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        KopisError::InvalidOperation(msg.into())
    }
}
