//! Artifact resolution: exchanging an artifact for its message, once.

use std::fmt;
use std::sync::Arc;

use kc_core::{EventListener, EventType, SecurityEvent, TracingEventListener};
use tracing::debug;

use super::map::ArtifactMap;
use crate::error::{ArtifactError, ResolutionError};

/// Resolves artifacts issued by the local entity.
///
/// The entry is removed before any check runs, so an artifact is never
/// resolvable twice, even when the first attempt is rejected. Every
/// rejection surfaces as [`ResolutionError::UnableToResolve`]; the real
/// reason is reported only to the event listener.
pub struct ArtifactResolver<M> {
    map: Arc<dyn ArtifactMap<M>>,
    local_issuer: String,
    listener: Arc<dyn EventListener>,
}

impl<M> ArtifactResolver<M> {
    /// Creates a resolver for artifacts issued by `local_issuer`.
    #[must_use]
    pub fn new(map: Arc<dyn ArtifactMap<M>>, local_issuer: impl Into<String>) -> Self {
        Self {
            map,
            local_issuer: local_issuer.into(),
            listener: Arc::new(TracingEventListener),
        }
    }

    /// Sets the event listener.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn EventListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Exchanges `artifact` for its message on behalf of `requester`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::UnableToResolve`] if the artifact is
    /// unknown, expired, already consumed, unreadable, not issued by the
    /// local entity or not issued to `requester`; and
    /// [`ResolutionError::Storage`] if the backing store fails.
    pub fn resolve(&self, artifact: &str, requester: &str) -> Result<Arc<M>, ResolutionError> {
        let entry = match self.map.get(artifact) {
            Ok(Some(entry)) => entry,
            Ok(None) => return Err(self.reject(artifact, requester, "artifact not found or expired")),
            Err(e) => return Err(self.failure(artifact, requester, e)),
        };

        match self.map.remove(artifact) {
            Ok(true) => {}
            Ok(false) => return Err(self.reject(artifact, requester, "artifact already consumed")),
            Err(e) => return Err(self.failure(artifact, requester, e)),
        }

        if entry.issuer_id() != self.local_issuer {
            return Err(self.reject(
                artifact,
                requester,
                &format!("artifact issued by '{}', not '{}'", entry.issuer_id(), self.local_issuer),
            ));
        }

        if entry.relying_party_id() != requester {
            return Err(self.reject(
                artifact,
                requester,
                &format!("artifact issued to '{}'", entry.relying_party_id()),
            ));
        }

        let Some(message) = entry.message() else {
            return Err(self.reject(artifact, requester, "artifact message unavailable"));
        };

        debug!(artifact, requester, "Resolved artifact");
        self.listener.on_event(
            &SecurityEvent::builder(EventType::ArtifactResolved)
                .success()
                .issuer(Some(self.local_issuer.as_str()))
                .peer(requester)
                .artifact(artifact)
                .build(),
        );
        Ok(message)
    }

    fn reject(&self, artifact: &str, requester: &str, reason: &str) -> ResolutionError {
        self.listener.on_event(
            &SecurityEvent::builder(EventType::ArtifactResolutionFailed)
                .failure(reason)
                .issuer(Some(self.local_issuer.as_str()))
                .peer(requester)
                .artifact(artifact)
                .build(),
        );
        ResolutionError::UnableToResolve
    }

    fn failure(&self, artifact: &str, requester: &str, error: ArtifactError) -> ResolutionError {
        match error {
            ArtifactError::Storage(e) => {
                self.reject(artifact, requester, &format!("storage failure: {e}"));
                ResolutionError::Storage(e)
            }
            other => self.reject(artifact, requester, &other.to_string()),
        }
    }
}

impl<M> fmt::Debug for ArtifactResolver<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactResolver")
            .field("map", &self.map)
            .field("local_issuer", &self.local_issuer)
            .field("listener", &self.listener)
            .finish()
    }
}
