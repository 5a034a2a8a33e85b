use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use super::{TokenKind, TrustEngine, TrustToken};
use crate::credential::Credential;
use crate::criteria::CriteriaSet;
use crate::error::SecurityResult;
use crate::resolver::CredentialResolver;

/// Decides whether an untrusted certificate credential matches a trusted one.
///
/// Any `Fn(&Credential, &Credential) -> bool` closure is an evaluator, so
/// alternate strategies such as subject-DN matching can be plugged in.
pub trait CertificateEvaluator: Send + Sync {
    /// Returns whether `untrusted` is vouched for by `trusted`.
    fn evaluate(&self, untrusted: &Credential, trusted: &Credential) -> bool;
}

impl<F> CertificateEvaluator for F
where
    F: Fn(&Credential, &Credential) -> bool + Send + Sync,
{
    fn evaluate(&self, untrusted: &Credential, trusted: &Credential) -> bool {
        self(untrusted, trusted)
    }
}

/// Byte-for-byte comparison of entity certificates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactCertificateEvaluator;

impl CertificateEvaluator for ExactCertificateEvaluator {
    fn evaluate(&self, untrusted: &Credential, trusted: &Credential) -> bool {
        match (untrusted.entity_certificate(), trusted.entity_certificate()) {
            (Some(presented), Some(known)) => presented.der() == known.der(),
            _ => false,
        }
    }
}

/// Trusts an entity certificate explicitly listed for the entity.
#[derive(Clone)]
pub struct ExplicitX509CertificateTrustEngine {
    resolver: Arc<dyn CredentialResolver>,
    evaluator: Arc<dyn CertificateEvaluator>,
}

impl ExplicitX509CertificateTrustEngine {
    /// Creates an engine using exact certificate comparison.
    #[must_use]
    pub fn new(resolver: Arc<dyn CredentialResolver>) -> Self {
        Self::with_evaluator(resolver, Arc::new(ExactCertificateEvaluator))
    }

    /// Creates an engine with a custom certificate evaluator.
    #[must_use]
    pub fn with_evaluator(
        resolver: Arc<dyn CredentialResolver>,
        evaluator: Arc<dyn CertificateEvaluator>,
    ) -> Self {
        Self {
            resolver,
            evaluator,
        }
    }
}

impl fmt::Debug for ExplicitX509CertificateTrustEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplicitX509CertificateTrustEngine")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl TrustEngine for ExplicitX509CertificateTrustEngine {
    fn token_kind(&self) -> TokenKind {
        TokenKind::Certificate
    }

    fn validate(&self, token: &TrustToken<'_>, criteria: &CriteriaSet) -> SecurityResult<bool> {
        let TrustToken::Certificate(untrusted) = token else {
            return Ok(false);
        };

        if untrusted.entity_certificate().is_none() {
            debug!("Untrusted credential carries no entity certificate; cannot evaluate");
            return Ok(false);
        }

        for trusted in self.resolver.resolve(criteria)? {
            let trusted = trusted?;
            if self.evaluator.evaluate(untrusted, &trusted) {
                debug!(entity_id = trusted.entity_id(), "Certificate matched trusted credential");
                return Ok(true);
            }
        }

        trace!(entity_id = criteria.entity_id(), "No trusted credential matched certificate");
        Ok(false)
    }
}
