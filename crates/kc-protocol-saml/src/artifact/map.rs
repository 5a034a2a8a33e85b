//! The artifact map: artifact string to stored protocol message.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use kc_cache::StorageService;
use kc_core::{Clock, Error, SecurityConfig, SystemClock};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::entry::ArtifactMapEntry;
use super::serializer::MessageSerializer;
use crate::error::{ArtifactError, ArtifactResult};

/// Storage partition holding artifact map entries.
pub const ARTIFACT_MAP_PARTITION: &str = "_SAMLArtifactMap";

/// Expiring store of protocol messages keyed by artifact.
///
/// `get` never consumes: the resolving party must `remove` explicitly.
pub trait ArtifactMap<M>: Send + Sync + fmt::Debug {
    /// Stores `message` under `artifact` until the configured lifetime elapses.
    ///
    /// # Errors
    ///
    /// Fails if the message cannot be serialized, the artifact is already
    /// mapped, or storage fails.
    fn put(&self, artifact: &str, relying_party_id: &str, issuer_id: &str, message: &M) -> ArtifactResult<()>;

    /// Returns the live entry for `artifact`. Expired entries are evicted
    /// and reported as absent.
    ///
    /// # Errors
    ///
    /// Fails if storage fails or the stored envelope is unreadable.
    fn get(&self, artifact: &str) -> ArtifactResult<Option<ArtifactMapEntry<M>>>;

    /// Removes the entry. Returns whether this call removed it.
    ///
    /// # Errors
    ///
    /// Fails if storage fails.
    fn remove(&self, artifact: &str) -> ArtifactResult<bool>;

    /// Returns whether the backend still holds an entry for `artifact`.
    ///
    /// Liveness is left to the backend; use [`get`](Self::get) when
    /// expiration matters.
    ///
    /// # Errors
    ///
    /// Fails if storage fails.
    fn contains(&self, artifact: &str) -> ArtifactResult<bool>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    issuer: String,
    relying_party: String,
    message: String,
    expiration_millis: i64,
}

/// [`ArtifactMap`] backed by a [`StorageService`].
pub struct StorageArtifactMap<M> {
    storage: Arc<dyn StorageService>,
    serializer: Arc<dyn MessageSerializer<M>>,
    clock: Arc<dyn Clock>,
    lifetime: Duration,
    partition: String,
}

impl<M> StorageArtifactMap<M> {
    /// Default entry lifetime.
    pub const DEFAULT_LIFETIME: Duration = Duration::minutes(1);

    /// Creates a builder.
    #[must_use]
    pub fn builder() -> StorageArtifactMapBuilder<M> {
        StorageArtifactMapBuilder {
            storage: None,
            serializer: None,
            clock: None,
            lifetime: Self::DEFAULT_LIFETIME,
            partition: ARTIFACT_MAP_PARTITION.to_string(),
        }
    }

    /// Returns the entry lifetime.
    #[must_use]
    pub const fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

impl<M> fmt::Debug for StorageArtifactMap<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageArtifactMap")
            .field("storage", &self.storage)
            .field("serializer", &self.serializer)
            .field("lifetime", &self.lifetime)
            .field("partition", &self.partition)
            .finish_non_exhaustive()
    }
}

impl<M> ArtifactMap<M> for StorageArtifactMap<M>
where
    M: Send + Sync,
{
    fn put(&self, artifact: &str, relying_party_id: &str, issuer_id: &str, message: &M) -> ArtifactResult<()> {
        let expiration = self.clock.now() + self.lifetime;
        let stored = StoredEntry {
            issuer: issuer_id.to_string(),
            relying_party: relying_party_id.to_string(),
            message: self.serializer.serialize(message)?,
            expiration_millis: expiration.timestamp_millis(),
        };
        let value = serde_json::to_string(&stored)?;

        if !self
            .storage
            .create(&self.partition, artifact, &value, Some(stored.expiration_millis))?
        {
            return Err(ArtifactError::AlreadyExists(artifact.to_string()));
        }

        debug!(artifact, issuer = issuer_id, relying_party = relying_party_id, %expiration, "Stored artifact");
        Ok(())
    }

    fn get(&self, artifact: &str) -> ArtifactResult<Option<ArtifactMapEntry<M>>> {
        let Some(record) = self.storage.read(&self.partition, artifact)? else {
            debug!(artifact, "Artifact not found");
            return Ok(None);
        };
        let stored: StoredEntry = serde_json::from_str(&record.value)?;

        if stored.expiration_millis <= self.clock.now_millis() {
            debug!(artifact, "Evicting expired artifact");
            self.storage.delete(&self.partition, artifact)?;
            return Ok(None);
        }

        let expiration = DateTime::<Utc>::from_timestamp_millis(stored.expiration_millis)
            .ok_or_else(|| ArtifactError::Serialization("expiration out of range".to_string()))?;

        Ok(Some(ArtifactMapEntry::new(
            artifact,
            stored.issuer,
            stored.relying_party,
            expiration,
            stored.message,
            Arc::clone(&self.serializer),
        )))
    }

    fn remove(&self, artifact: &str) -> ArtifactResult<bool> {
        let removed = self.storage.delete(&self.partition, artifact)?;
        debug!(artifact, removed, "Removed artifact");
        Ok(removed)
    }

    fn contains(&self, artifact: &str) -> ArtifactResult<bool> {
        Ok(self.storage.read(&self.partition, artifact)?.is_some())
    }
}

/// Builder for [`StorageArtifactMap`].
pub struct StorageArtifactMapBuilder<M> {
    storage: Option<Arc<dyn StorageService>>,
    serializer: Option<Arc<dyn MessageSerializer<M>>>,
    clock: Option<Arc<dyn Clock>>,
    lifetime: Duration,
    partition: String,
}

impl<M> StorageArtifactMapBuilder<M> {
    /// Sets the backing storage service. Required.
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn StorageService>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Sets the message serializer. Required.
    #[must_use]
    pub fn serializer(mut self, serializer: Arc<dyn MessageSerializer<M>>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Sets the clock. Defaults to the system clock.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the entry lifetime.
    #[must_use]
    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Applies the configured artifact lifetime.
    #[must_use]
    pub fn config(self, config: &SecurityConfig) -> Self {
        self.lifetime(config.artifact_lifetime())
    }

    /// Overrides the storage partition.
    #[must_use]
    pub fn partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = partition.into();
        self
    }

    /// Builds the map.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the storage service or serializer is
    /// missing, or the lifetime is not positive.
    pub fn build(self) -> ArtifactResult<StorageArtifactMap<M>> {
        let storage = self.storage.ok_or(Error::MissingComponent("storage service"))?;
        let serializer = self.serializer.ok_or(Error::MissingComponent("message serializer"))?;
        if self.lifetime <= Duration::zero() {
            return Err(Error::config("artifact lifetime must be positive").into());
        }

        Ok(StorageArtifactMap {
            storage,
            serializer,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            lifetime: self.lifetime,
            partition: self.partition,
        })
    }
}

impl<M> fmt::Debug for StorageArtifactMapBuilder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageArtifactMapBuilder")
            .field("storage", &self.storage.is_some())
            .field("serializer", &self.serializer.is_some())
            .field("lifetime", &self.lifetime)
            .field("partition", &self.partition)
            .finish_non_exhaustive()
    }
}
