//! Security audit events.
//!
//! ## NIST 800-53 Rev5: AU-2 (Event Logging)
//!
//! Policy decisions and artifact lifecycle steps are reported as structured
//! events to an injected [`EventListener`]. The full failure reason is kept
//! here and never echoed back to the remote peer.
//!
//! ## NIST 800-53 Rev5: AU-3 (Content of Audit Records)
//!
//! All events include:
//! - Timestamp (ISO 8601)
//! - Event type
//! - Issuer and message identifiers (when available)
//! - Outcome (success/failure)

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    // Policy events
    /// A security policy accepted an inbound message.
    PolicyAccepted,
    /// A security policy rejected an inbound message.
    PolicyRejected,

    // Artifact events
    /// A message was stored under an artifact.
    ArtifactIssued,
    /// An artifact was exchanged for its message.
    ArtifactResolved,
    /// An artifact could not be resolved.
    ArtifactResolutionFailed,
}

/// Outcome of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Failure,
}

/// A security event for audit logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Unique event identifier.
    pub id: Uuid,

    /// Timestamp of the event (ISO 8601).
    pub timestamp: DateTime<Utc>,

    /// Type of event.
    pub event_type: EventType,

    /// Outcome of the event.
    pub outcome: EventOutcome,

    /// Issuer entity ID, if known.
    pub issuer: Option<String>,

    /// Peer or relying party entity ID, if known.
    pub peer: Option<String>,

    /// Protocol message ID, if known.
    pub message_id: Option<String>,

    /// Artifact, if the event concerns one.
    pub artifact: Option<String>,

    /// Local-only failure reason.
    pub reason: Option<String>,

    /// Additional details as key-value pairs.
    pub details: Vec<(String, String)>,
}

impl SecurityEvent {
    /// Creates a new event builder.
    #[must_use]
    pub const fn builder(event_type: EventType) -> EventBuilder {
        EventBuilder::new(event_type)
    }
}

/// Builder for creating events.
#[derive(Debug)]
pub struct EventBuilder {
    event_type: EventType,
    outcome: EventOutcome,
    issuer: Option<String>,
    peer: Option<String>,
    message_id: Option<String>,
    artifact: Option<String>,
    reason: Option<String>,
    details: Vec<(String, String)>,
}

impl EventBuilder {
    /// Creates a new event builder.
    #[must_use]
    pub const fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            outcome: EventOutcome::Success,
            issuer: None,
            peer: None,
            message_id: None,
            artifact: None,
            reason: None,
            details: Vec::new(),
        }
    }

    /// Sets the outcome to success.
    #[must_use]
    pub const fn success(mut self) -> Self {
        self.outcome = EventOutcome::Success;
        self
    }

    /// Sets the outcome to failure with a reason.
    #[must_use]
    pub fn failure(mut self, reason: impl Into<String>) -> Self {
        self.outcome = EventOutcome::Failure;
        self.reason = Some(reason.into());
        self
    }

    /// Sets the issuer.
    #[must_use]
    pub fn issuer(mut self, issuer: Option<impl Into<String>>) -> Self {
        self.issuer = issuer.map(Into::into);
        self
    }

    /// Sets the peer entity.
    #[must_use]
    pub fn peer(mut self, peer: impl Into<String>) -> Self {
        self.peer = Some(peer.into());
        self
    }

    /// Sets the message ID.
    #[must_use]
    pub fn message_id(mut self, message_id: Option<impl Into<String>>) -> Self {
        self.message_id = message_id.map(Into::into);
        self
    }

    /// Sets the artifact.
    #[must_use]
    pub fn artifact(mut self, artifact: impl Into<String>) -> Self {
        self.artifact = Some(artifact.into());
        self
    }

    /// Adds a detail key-value pair.
    #[must_use]
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push((key.into(), value.into()));
        self
    }

    /// Builds the event.
    #[must_use]
    pub fn build(self) -> SecurityEvent {
        SecurityEvent {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            event_type: self.event_type,
            outcome: self.outcome,
            issuer: self.issuer,
            peer: self.peer,
            message_id: self.message_id,
            artifact: self.artifact,
            reason: self.reason,
            details: self.details,
        }
    }
}

/// Receives security events.
///
/// Implementations must be thread-safe; events are emitted from whichever
/// request thread made the decision.
pub trait EventListener: Send + Sync + Debug {
    /// Handles one event.
    fn on_event(&self, event: &SecurityEvent);
}

/// Emits events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventListener;

impl EventListener for TracingEventListener {
    fn on_event(&self, event: &SecurityEvent) {
        match event.outcome {
            EventOutcome::Success => tracing::info!(
                event_id = %event.id,
                event_type = ?event.event_type,
                issuer = event.issuer.as_deref(),
                peer = event.peer.as_deref(),
                message_id = event.message_id.as_deref(),
                artifact = event.artifact.as_deref(),
                "Security event"
            ),
            EventOutcome::Failure => tracing::warn!(
                event_id = %event.id,
                event_type = ?event.event_type,
                issuer = event.issuer.as_deref(),
                peer = event.peer.as_deref(),
                message_id = event.message_id.as_deref(),
                artifact = event.artifact.as_deref(),
                reason = event.reason.as_deref(),
                "Security event"
            ),
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventListener;

impl EventListener for NoopEventListener {
    fn on_event(&self, _event: &SecurityEvent) {}
}
