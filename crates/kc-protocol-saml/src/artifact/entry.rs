//! Artifact map entries.

use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use tracing::warn;

use super::serializer::MessageSerializer;

/// A message stored under an artifact, plus who may fetch it.
///
/// The message is rebuilt from its serialized form on first access and the
/// result (including a failure) is remembered for the life of the entry.
pub struct ArtifactMapEntry<M> {
    artifact: String,
    issuer_id: String,
    relying_party_id: String,
    expiration: DateTime<Utc>,
    serialized: String,
    serializer: Arc<dyn MessageSerializer<M>>,
    message: OnceLock<Option<Arc<M>>>,
}

impl<M> ArtifactMapEntry<M> {
    pub(crate) fn new(
        artifact: impl Into<String>,
        issuer_id: impl Into<String>,
        relying_party_id: impl Into<String>,
        expiration: DateTime<Utc>,
        serialized: String,
        serializer: Arc<dyn MessageSerializer<M>>,
    ) -> Self {
        Self {
            artifact: artifact.into(),
            issuer_id: issuer_id.into(),
            relying_party_id: relying_party_id.into(),
            expiration,
            serialized,
            serializer,
            message: OnceLock::new(),
        }
    }

    /// Returns the artifact.
    #[must_use]
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// Returns the entity ID of the entry's issuer.
    #[must_use]
    pub fn issuer_id(&self) -> &str {
        &self.issuer_id
    }

    /// Returns the entity ID the artifact was issued to.
    #[must_use]
    pub fn relying_party_id(&self) -> &str {
        &self.relying_party_id
    }

    /// Returns the absolute expiration.
    #[must_use]
    pub const fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    /// Returns the message, or `None` if it could not be rebuilt.
    pub fn message(&self) -> Option<Arc<M>> {
        self.message
            .get_or_init(|| match self.serializer.deserialize(&self.serialized) {
                Ok(message) => Some(Arc::new(message)),
                Err(e) => {
                    warn!(artifact = %self.artifact, error = %e, "Artifact message unavailable");
                    None
                }
            })
            .clone()
    }
}

impl<M> fmt::Debug for ArtifactMapEntry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactMapEntry")
            .field("artifact", &self.artifact)
            .field("issuer_id", &self.issuer_id)
            .field("relying_party_id", &self.relying_party_id)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}
