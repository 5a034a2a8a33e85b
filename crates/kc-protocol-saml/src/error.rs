//! SAML error types.
//!
//! Artifact map operations distinguish "the backing store failed" from
//! "the artifact does not exist"; absence is `Ok(None)`, never an error.
//! Artifact resolution collapses every trust-relevant failure into one
//! opaque [`ResolutionError::UnableToResolve`].

use kc_cache::StorageError;
use thiserror::Error;

/// Result type for artifact map operations.
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Artifact map errors.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The message or its storage envelope could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An entry for this artifact already exists.
    #[error("artifact already exists: {0}")]
    AlreadyExists(String),

    /// The artifact string is not a well-formed SAML 2.0 artifact.
    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    /// The backing storage service failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Components were wired incorrectly.
    #[error(transparent)]
    Config(#[from] kc_core::Error),
}

impl From<serde_json::Error> for ArtifactError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<base64::DecodeError> for ArtifactError {
    fn from(err: base64::DecodeError) -> Self {
        Self::InvalidArtifact(err.to_string())
    }
}

/// Outcome of a failed artifact resolution.
///
/// The peer learns only that resolution failed; the reason goes to the
/// event listener.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Not found, expired, already consumed, unreadable, or not issued to
    /// the requester.
    #[error("unable to resolve artifact")]
    UnableToResolve,

    /// The backing storage service failed.
    #[error("artifact storage unavailable: {0}")]
    Storage(#[source] StorageError),
}

impl ResolutionError {
    /// Returns the SAML status code reported to the peer.
    #[must_use]
    pub const fn status_code(&self) -> &'static str {
        match self {
            Self::UnableToResolve => "urn:oasis:names:tc:SAML:2.0:status:Requester",
            Self::Storage(_) => "urn:oasis:names:tc:SAML:2.0:status:Responder",
        }
    }

    /// Returns the sub-status code reported to the peer.
    #[must_use]
    pub const fn sub_status_code(&self) -> Option<&'static str> {
        match self {
            Self::UnableToResolve => Some("urn:oasis:names:tc:SAML:2.0:status:RequestDenied"),
            Self::Storage(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unable_to_resolve_carries_no_detail() {
        let err = ResolutionError::UnableToResolve;
        assert_eq!(err.to_string(), "unable to resolve artifact");
        assert_eq!(err.status_code(), "urn:oasis:names:tc:SAML:2.0:status:Requester");
        assert_eq!(
            err.sub_status_code(),
            Some("urn:oasis:names:tc:SAML:2.0:status:RequestDenied")
        );
    }

    #[test]
    fn storage_failure_is_a_responder_error() {
        let err = ResolutionError::Storage(StorageError::Connection("refused".to_string()));
        assert_eq!(err.status_code(), "urn:oasis:names:tc:SAML:2.0:status:Responder");
        assert!(err.sub_status_code().is_none());

        let err = ArtifactError::from(StorageError::Connection("refused".to_string()));
        assert!(matches!(err, ArtifactError::Storage(_)));
    }
}
