//! Error types for the audit pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the audit pipeline.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Configuration-related errors.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Severity registry errors.
    #[error("Severity registry error: {kind}")]
    Registry { kind: RegistryErrorKind },

    /// Sink errors.
    #[error("Sink error: {kind}")]
    Sink { kind: SinkErrorKind },

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Severity registry error kinds.
///
/// A conflict is a startup configuration error: the registry is write-once
/// and two different numeric levels can never share a name.
#[derive(Error, Debug)]
pub enum RegistryErrorKind {
    #[error("Severity '{name}' already registered at level {existing}, refusing level {requested}")]
    Conflict {
        name: String,
        existing: u8,
        requested: u8,
    },

    #[error("Severity table lock poisoned")]
    LockPoisoned,
}

/// Sink error kinds.
#[derive(Error, Debug)]
pub enum SinkErrorKind {
    #[error("Failed to open audit log '{path}': {message}")]
    Open { path: PathBuf, message: String },

    #[error("Failed to write audit record: {message}")]
    Write { message: String },

    #[error("Failed to rotate audit log '{path}': {message}")]
    Rotate { path: PathBuf, message: String },
}

/// Result type alias for audit pipeline operations.
pub type AuditResult<T> = Result<T, AuditError>;
