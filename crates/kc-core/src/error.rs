//! Error handling for the SAML trust core.
//!
//! ## NIST 800-53 Rev5: SI-11 (Error Handling)
//!
//! Error messages are designed to be informative for local diagnostics while
//! not exposing sensitive information to the remote peer.

use thiserror::Error;

/// Result type alias using the core error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for construction and configuration failures.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    ///
    /// Raised at construction time when a required collaborator or setting
    /// is missing. Never deferred to first use.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required collaborator was not supplied.
    #[error("missing required component: {0}")]
    MissingComponent(&'static str),

    /// Authentication error.
    ///
    /// ## NIST 800-53 Rev5: IA-6 (Authentication Feedback)
    ///
    /// Uses a generic message so the peer cannot tell why trust failed.
    #[error("authentication failed")]
    Authentication,

    /// Internal error.
    #[error("internal error")]
    Internal,
}

impl Error {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns whether this error was raised while wiring components together.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::MissingComponent(_))
    }
}
