//! Artifact issuance: minting an artifact and parking its message.

use std::fmt;
use std::sync::Arc;

use kc_core::{EventListener, EventType, SecurityEvent, TracingEventListener};
use tracing::debug;

use super::map::ArtifactMap;
use super::token::Saml2Artifact;
use crate::error::ArtifactResult;

/// Issues type 0x0004 artifacts on behalf of the local entity.
pub struct ArtifactIssuer<M> {
    map: Arc<dyn ArtifactMap<M>>,
    local_issuer: String,
    endpoint_index: u16,
    listener: Arc<dyn EventListener>,
}

impl<M> ArtifactIssuer<M> {
    /// Creates an issuer for `local_issuer`, advertising endpoint index 0.
    #[must_use]
    pub fn new(map: Arc<dyn ArtifactMap<M>>, local_issuer: impl Into<String>) -> Self {
        Self {
            map,
            local_issuer: local_issuer.into(),
            endpoint_index: 0,
            listener: Arc::new(TracingEventListener),
        }
    }

    /// Sets the artifact resolution endpoint index carried by issued artifacts.
    #[must_use]
    pub const fn with_endpoint_index(mut self, endpoint_index: u16) -> Self {
        self.endpoint_index = endpoint_index;
        self
    }

    /// Sets the event listener.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn EventListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Stores `message` for `relying_party_id` and returns the encoded artifact.
    ///
    /// # Errors
    ///
    /// Fails if the message cannot be stored. A handle collision surfaces as
    /// [`ArtifactError::AlreadyExists`](crate::error::ArtifactError::AlreadyExists).
    pub fn issue(&self, relying_party_id: &str, message: &M) -> ArtifactResult<String> {
        let artifact = Saml2Artifact::build(&self.local_issuer, self.endpoint_index).encode();
        self.map.put(&artifact, relying_party_id, &self.local_issuer, message)?;

        debug!(artifact = %artifact, relying_party = relying_party_id, "Issued artifact");
        self.listener.on_event(
            &SecurityEvent::builder(EventType::ArtifactIssued)
                .success()
                .issuer(Some(self.local_issuer.as_str()))
                .peer(relying_party_id)
                .artifact(&artifact)
                .build(),
        );
        Ok(artifact)
    }
}

impl<M> fmt::Debug for ArtifactIssuer<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactIssuer")
            .field("local_issuer", &self.local_issuer)
            .field("endpoint_index", &self.endpoint_index)
            .finish_non_exhaustive()
    }
}
