use std::sync::Arc;

use kc_core::Error;
use tracing::debug;

use crate::credential::Credential;
use crate::criteria::{CriteriaSet, Criterion};
use crate::error::{SecurityError, SecurityResult};
use crate::policy::{ContextSlot, SecurityPolicyContext, SecurityPolicyRule};
use crate::trust::{TokenKind, TrustEngine, TrustToken};

/// Authenticates the issuer by the TLS client certificate it presented.
///
/// Applies only when the transport carries a certificate and the issuer is
/// already known.
#[derive(Debug, Clone)]
pub struct ClientCertAuthRule {
    engine: Arc<dyn TrustEngine>,
}

impl ClientCertAuthRule {
    const NAME: &'static str = "client-cert-auth";

    /// Creates a rule backed by a certificate trust engine.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `engine` does not evaluate certificates.
    pub fn new(engine: Arc<dyn TrustEngine>) -> SecurityResult<Self> {
        if engine.token_kind() != TokenKind::Certificate {
            return Err(Error::config("client certificate rule requires a certificate trust engine").into());
        }
        Ok(Self { engine })
    }
}

impl SecurityPolicyRule for ClientCertAuthRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate(&self, context: &mut SecurityPolicyContext<'_>) -> SecurityResult<()> {
        let chain = context.transport().peer_certificates();
        if chain.is_empty() {
            debug!("No client certificate presented");
            return Ok(());
        }
        let Some(issuer) = context.issuer() else {
            debug!("Issuer unknown; client certificate not evaluated");
            return Ok(());
        };

        let presented = Credential::builder()
            .entity_id(issuer)
            .certificate_chain(chain.to_vec())
            .build()?;
        let mut criteria = CriteriaSet::new().with(Criterion::EntityId(issuer.to_string()));
        if let Some(role) = context.slot(ContextSlot::PeerEntityRole) {
            criteria.add(Criterion::EntityRole(role.to_string()));
        }
        if let Some(protocol) = context.slot(ContextSlot::Protocol) {
            criteria.add(Criterion::Protocol(protocol.to_string()));
        }

        if !self.engine.validate(&TrustToken::Certificate(&presented), &criteria)? {
            return Err(SecurityError::rejected(
                Self::NAME,
                format!("client certificate is not trusted for '{issuer}'"),
            ));
        }

        debug!(issuer, "Client certificate trusted");
        context.set_issuer_authenticated(true);
        Ok(())
    }
}
