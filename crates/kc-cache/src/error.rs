//! Storage error types.

use std::fmt;

/// Storage operation errors.
#[derive(Debug)]
pub enum StorageError {
    /// Connection to storage backend failed.
    Connection(String),
    /// Stored value could not be encoded or decoded.
    Serialization(String),
    /// Optimistic update or delete used a stale version.
    VersionMismatch {
        /// Version supplied by the caller.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },
    /// Context, key or value exceeds the backend capabilities.
    Capacity(String),
    /// Invalid storage configuration.
    Configuration(String),
    /// Internal storage error.
    Internal(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(msg) => write!(f, "storage connection error: {msg}"),
            Self::Serialization(msg) => write!(f, "storage serialization error: {msg}"),
            Self::VersionMismatch { expected, actual } => write!(
                f,
                "storage version mismatch: expected {expected}, found {actual}"
            ),
            Self::Capacity(msg) => write!(f, "storage capacity exceeded: {msg}"),
            Self::Configuration(msg) => write!(f, "storage configuration error: {msg}"),
            Self::Internal(msg) => write!(f, "internal storage error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
