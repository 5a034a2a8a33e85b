//! Trust engines.
//!
//! An engine answers one question: is this presented key or certificate
//! trusted for the given criteria? "No" is `Ok(false)`. Engines hold no
//! per-call state and never cache answers; every call re-resolves trusted
//! credentials so resolver-side invalidation is always honoured.

mod chaining;
mod explicit_key;
mod signature;
mod x509;

use std::fmt;

use crate::credential::Credential;
use crate::criteria::CriteriaSet;
use crate::error::SecurityResult;

pub use chaining::ChainingTrustEngine;
pub use explicit_key::ExplicitKeyTrustEngine;
pub use signature::{PublicKeySignatureVerifier, SignatureTrustEngine, SignatureVerifier, SignedContent};
pub use x509::{CertificateEvaluator, ExactCertificateEvaluator, ExplicitX509CertificateTrustEngine};

/// The kind of token an engine evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A raw public or secret key.
    Key,
    /// An X.509 entity certificate.
    Certificate,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key => f.write_str("key"),
            Self::Certificate => f.write_str("certificate"),
        }
    }
}

/// An untrusted token presented for evaluation.
#[derive(Debug, Clone, Copy)]
pub enum TrustToken<'a> {
    /// Evaluate the credential's public key, or its secret key when it has none.
    Key(&'a Credential),
    /// Evaluate the credential's entity certificate.
    Certificate(&'a Credential),
}

impl<'a> TrustToken<'a> {
    /// Returns the token kind.
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        match self {
            Self::Key(_) => TokenKind::Key,
            Self::Certificate(_) => TokenKind::Certificate,
        }
    }

    /// Returns the credential carrying the token.
    #[must_use]
    pub const fn credential(&self) -> &'a Credential {
        match self {
            Self::Key(c) | Self::Certificate(c) => c,
        }
    }
}

/// Decides whether an untrusted token is trustworthy.
pub trait TrustEngine: Send + Sync + fmt::Debug {
    /// Returns the kind of token this engine evaluates.
    fn token_kind(&self) -> TokenKind;

    /// Validates a token against the trusted credentials selected by `criteria`.
    ///
    /// A token of a kind the engine does not evaluate is not trusted.
    ///
    /// # Errors
    ///
    /// Returns an error only when trusted credentials cannot be resolved.
    fn validate(&self, token: &TrustToken<'_>, criteria: &CriteriaSet) -> SecurityResult<bool>;
}
