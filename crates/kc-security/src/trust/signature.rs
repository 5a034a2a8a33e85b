use std::fmt;
use std::sync::Arc;

use kc_crypto::{verify_signature, SignatureAlgorithm};
use tracing::{debug, warn};

use super::{TokenKind, TrustEngine, TrustToken};
use crate::credential::Credential;
use crate::criteria::CriteriaSet;
use crate::error::SecurityResult;
use crate::resolver::CredentialResolver;

/// Raw signed octets with their signature.
///
/// Canonicalization is done by the caller; `content` is exactly what was signed.
#[derive(Debug, Clone, Copy)]
pub struct SignedContent<'a> {
    /// The signed octets.
    pub content: &'a [u8],
    /// The signature value.
    pub signature: &'a [u8],
    /// XML-DSig signature algorithm URI.
    pub algorithm: &'a str,
}

/// Checks a signature against a credential's key.
pub trait SignatureVerifier: Send + Sync + fmt::Debug {
    /// Returns whether `content` was signed with `credential`'s key.
    ///
    /// # Errors
    ///
    /// Returns an error only if verification could not be attempted.
    fn verify(&self, credential: &Credential, content: &SignedContent<'_>) -> SecurityResult<bool>;
}

/// Verifies signatures with the credential's public key using aws-lc-rs.
///
/// Unknown or disallowed algorithms and unusable keys verify as `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicKeySignatureVerifier {
    allow_sha1: bool,
}

impl PublicKeySignatureVerifier {
    /// Creates a verifier that rejects SHA-1 signatures.
    #[must_use]
    pub const fn new() -> Self {
        Self { allow_sha1: false }
    }

    /// Allows SHA-1 based signatures (not recommended).
    #[must_use]
    pub const fn allow_sha1(mut self, allow: bool) -> Self {
        self.allow_sha1 = allow;
        self
    }
}

impl SignatureVerifier for PublicKeySignatureVerifier {
    fn verify(&self, credential: &Credential, content: &SignedContent<'_>) -> SecurityResult<bool> {
        let Some(algorithm) = SignatureAlgorithm::from_uri(content.algorithm) else {
            warn!(algorithm = content.algorithm, "Unknown signature algorithm");
            return Ok(false);
        };
        let Some(key) = credential.public_key() else {
            debug!(entity_id = credential.entity_id(), "Credential has no public key");
            return Ok(false);
        };

        match verify_signature(
            algorithm,
            key.encoded(),
            content.content,
            content.signature,
            self.allow_sha1,
        ) {
            Ok(valid) => Ok(valid),
            Err(e) => {
                warn!(error = %e, "Signature could not be verified");
                Ok(false)
            }
        }
    }
}

/// Decides whether a signature was made with a trusted key.
#[derive(Debug, Clone)]
pub struct SignatureTrustEngine {
    resolver: Arc<dyn CredentialResolver>,
    verifier: Arc<dyn SignatureVerifier>,
    key_trust: Arc<dyn TrustEngine>,
}

impl SignatureTrustEngine {
    /// Creates an engine.
    ///
    /// `resolver` supplies the trusted signing credentials; `key_trust`
    /// decides whether a credential carried inside the message may be used.
    #[must_use]
    pub fn new(
        resolver: Arc<dyn CredentialResolver>,
        verifier: Arc<dyn SignatureVerifier>,
        key_trust: Arc<dyn TrustEngine>,
    ) -> Self {
        Self {
            resolver,
            verifier,
            key_trust,
        }
    }

    /// Validates `content`.
    ///
    /// A `candidate` credential (from the message's `KeyInfo`) is accepted
    /// only if it both verifies the signature and is itself trusted.
    /// Otherwise every resolved trusted credential is tried in turn.
    ///
    /// # Errors
    ///
    /// Returns an error when trusted credentials cannot be resolved.
    pub fn validate(
        &self,
        content: &SignedContent<'_>,
        candidate: Option<&Credential>,
        criteria: &CriteriaSet,
    ) -> SecurityResult<bool> {
        if let Some(candidate) = candidate {
            if self.verifier.verify(candidate, content)? {
                let token = match self.key_trust.token_kind() {
                    TokenKind::Key => TrustToken::Key(candidate),
                    TokenKind::Certificate => TrustToken::Certificate(candidate),
                };
                if self.key_trust.validate(&token, criteria)? {
                    debug!(entity_id = criteria.entity_id(), "Signature verified with trusted KeyInfo credential");
                    return Ok(true);
                }
                debug!(entity_id = criteria.entity_id(), "KeyInfo credential verified signature but is not trusted");
            }
        }

        for trusted in self.resolver.resolve(criteria)? {
            let trusted = trusted?;
            if self.verifier.verify(&trusted, content)? {
                debug!(entity_id = criteria.entity_id(), "Signature verified with trusted credential");
                return Ok(true);
            }
        }

        debug!(entity_id = criteria.entity_id(), "Signature not verified by any trusted credential");
        Ok(false)
    }
}
