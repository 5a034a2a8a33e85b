use std::sync::Arc;

use tracing::{debug, trace};

use super::{TokenKind, TrustEngine, TrustToken};
use crate::credential::Credential;
use crate::criteria::CriteriaSet;
use crate::error::SecurityResult;
use crate::resolver::CredentialResolver;

/// Trusts a key when it exactly equals a key of a resolved trusted credential.
#[derive(Debug, Clone)]
pub struct ExplicitKeyTrustEngine {
    resolver: Arc<dyn CredentialResolver>,
}

impl ExplicitKeyTrustEngine {
    /// Creates an engine backed by the given resolver.
    #[must_use]
    pub fn new(resolver: Arc<dyn CredentialResolver>) -> Self {
        Self { resolver }
    }

    /// Returns the trusted credential resolver.
    #[must_use]
    pub fn resolver(&self) -> &Arc<dyn CredentialResolver> {
        &self.resolver
    }

    fn keys_match(untrusted: &Credential, trusted: &Credential) -> bool {
        if let Some(key) = untrusted.public_key() {
            return trusted.public_key() == Some(key);
        }
        if let Some(key) = untrusted.secret_key() {
            return trusted.secret_key() == Some(key);
        }
        false
    }
}

impl TrustEngine for ExplicitKeyTrustEngine {
    fn token_kind(&self) -> TokenKind {
        TokenKind::Key
    }

    fn validate(&self, token: &TrustToken<'_>, criteria: &CriteriaSet) -> SecurityResult<bool> {
        let TrustToken::Key(untrusted) = token else {
            return Ok(false);
        };

        if untrusted.public_key().is_none() && untrusted.secret_key().is_none() {
            debug!("Untrusted credential carries no key; cannot evaluate");
            return Ok(false);
        }

        for trusted in self.resolver.resolve(criteria)? {
            let trusted = trusted?;
            if Self::keys_match(untrusted, &trusted) {
                debug!(entity_id = trusted.entity_id(), "Key matched trusted credential");
                return Ok(true);
            }
        }

        trace!(entity_id = criteria.entity_id(), "No trusted credential matched key");
        Ok(false)
    }
}
