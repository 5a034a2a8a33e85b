//! Storage service contract.

use std::fmt::Debug;

use crate::error::StorageResult;

/// A stored value with its version and expiration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRecord {
    /// Opaque stored value.
    pub value: String,
    /// Version, starting at 1 and incremented on every update.
    pub version: u64,
    /// Absolute expiration in epoch milliseconds, `None` if it never expires.
    pub expiration: Option<i64>,
}

impl StorageRecord {
    /// Creates a first-version record.
    #[must_use]
    pub fn new(value: impl Into<String>, expiration: Option<i64>) -> Self {
        Self {
            value: value.into(),
            version: 1,
            expiration,
        }
    }

    /// Returns whether the record is expired at `now_millis`.
    #[must_use]
    pub fn is_expired(&self, now_millis: i64) -> bool {
        self.expiration.is_some_and(|exp| exp <= now_millis)
    }
}

/// Size limits advertised by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageCapabilities {
    /// Maximum context (partition) length in characters.
    pub context_size: usize,
    /// Maximum key length in characters.
    pub key_size: usize,
    /// Maximum value length in characters.
    pub value_size: usize,
}

impl Default for StorageCapabilities {
    fn default() -> Self {
        Self {
            context_size: 255,
            key_size: 255,
            value_size: usize::MAX,
        }
    }
}

/// Partitioned key/value storage with expiration and optimistic versioning.
///
/// Implementations must be thread-safe and support concurrent access. The
/// host application supplies the backend (in-memory, relational, LDAP or a
/// distributed cache); this workspace ships [`InMemoryStorageService`].
///
/// Expirations are absolute epoch milliseconds. `None` means the record
/// never expires. Records past their expiration must not be returned by
/// [`read`](Self::read).
///
/// [`delete`](Self::delete) must be atomic: when several callers delete the
/// same key concurrently, exactly one observes `true`. Single-use consumers
/// such as artifact resolution rely on this.
///
/// [`InMemoryStorageService`]: crate::InMemoryStorageService
pub trait StorageService: Send + Sync + Debug {
    /// Returns the backend size limits.
    fn capabilities(&self) -> StorageCapabilities {
        StorageCapabilities::default()
    }

    /// Creates a record.
    ///
    /// Returns `false` if a live record already exists under the key.
    fn create(
        &self,
        context: &str,
        key: &str,
        value: &str,
        expiration: Option<i64>,
    ) -> StorageResult<bool>;

    /// Reads a live record.
    fn read(&self, context: &str, key: &str) -> StorageResult<Option<StorageRecord>>;

    /// Replaces the value and expiration of a live record.
    ///
    /// Returns the new version, or `None` if no live record exists.
    fn update(
        &self,
        context: &str,
        key: &str,
        value: &str,
        expiration: Option<i64>,
    ) -> StorageResult<Option<u64>>;

    /// Replaces a live record only if it is still at `version`.
    ///
    /// Returns the new version, or `None` if no live record exists.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::VersionMismatch`] if the stored version differs.
    ///
    /// [`StorageError::VersionMismatch`]: crate::StorageError::VersionMismatch
    fn update_with_version(
        &self,
        version: u64,
        context: &str,
        key: &str,
        value: &str,
        expiration: Option<i64>,
    ) -> StorageResult<Option<u64>>;

    /// Changes the expiration of a live record without touching its value.
    ///
    /// Returns `false` if no live record exists.
    fn update_expiration(
        &self,
        context: &str,
        key: &str,
        expiration: Option<i64>,
    ) -> StorageResult<bool>;

    /// Deletes a record.
    ///
    /// Returns `false` if nothing was stored under the key. Never an error
    /// for a missing key.
    fn delete(&self, context: &str, key: &str) -> StorageResult<bool>;

    /// Deletes a record only if it is still at `version`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::VersionMismatch`] if the stored version differs.
    ///
    /// [`StorageError::VersionMismatch`]: crate::StorageError::VersionMismatch
    fn delete_with_version(&self, version: u64, context: &str, key: &str)
    -> StorageResult<bool>;

    /// Removes every record in a context.
    fn delete_context(&self, context: &str) -> StorageResult<()>;

    /// Sets the expiration of every live record in a context.
    fn update_context_expiration(&self, context: &str, expiration: Option<i64>)
    -> StorageResult<()>;

    /// Removes expired records from a context.
    ///
    /// Returns the number of records removed.
    fn reap(&self, context: &str) -> StorageResult<usize>;
}
