//! Security error types.
//!
//! "Not trusted" is never an error: trust engines answer `Ok(false)`.
//! Errors are reserved for infrastructure failures (a resolver that cannot
//! reach its source, a broken replay store) and for policy rejections.

use kc_cache::StorageError;
use thiserror::Error;

/// Result type for security operations.
pub type SecurityResult<T> = Result<T, SecurityError>;

/// Security evaluation errors.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// A credential resolver could not produce credentials.
    #[error("credential resolution failed: {0}")]
    Resolution(String),

    /// Credential material is inconsistent.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// A signature could not be evaluated at all.
    #[error("signature evaluation failed: {0}")]
    Signature(String),

    /// A policy rule rejected the message.
    #[error("security policy rule '{rule}' rejected message: {reason}")]
    PolicyRejected {
        /// Name of the failing rule.
        rule: &'static str,
        /// Human-readable reason, for local logs only.
        reason: String,
    },

    /// The replay store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Components were wired incorrectly.
    #[error(transparent)]
    Config(#[from] kc_core::Error),
}

impl SecurityError {
    /// Creates a policy rejection.
    #[must_use]
    pub fn rejected(rule: &'static str, reason: impl Into<String>) -> Self {
        Self::PolicyRejected {
            rule,
            reason: reason.into(),
        }
    }

    /// Returns whether the message itself was rejected, as opposed to an
    /// infrastructure or configuration failure.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::PolicyRejected { .. })
    }

    /// Returns the SAML status code for this error.
    ///
    /// Rejections are the requester's fault; everything else is reported as
    /// a responder failure. No detail is carried to the peer.
    #[must_use]
    pub const fn status_code(&self) -> &'static str {
        match self {
            Self::PolicyRejected { .. } | Self::InvalidCredential(_) => {
                "urn:oasis:names:tc:SAML:2.0:status:Requester"
            }
            _ => "urn:oasis:names:tc:SAML:2.0:status:Responder",
        }
    }
}
