//! The rule catalogue.
//!
//! Order matters when composing a policy: [`MessageInfoRule`] must run
//! before any rule that needs the issuer, and the authentication rules
//! before [`MandatoryAuthenticatedMessageRule`].

mod client_cert;
mod http;
mod issuer;
mod lifetime;
mod replay;
mod signature;
mod simple_sign;

pub use client_cert::ClientCertAuthRule;
pub use http::HttpRule;
pub use issuer::{MandatoryAuthenticatedMessageRule, MandatoryIssuerRule, MessageInfoRule};
pub use lifetime::MessageLifetimeRule;
pub use replay::MessageReplayRule;
pub use signature::MessageSignatureRule;
pub use simple_sign::SimpleSignatureRule;

use crate::credential::UsageType;
use crate::criteria::{CriteriaSet, Criterion};
use crate::policy::{ContextSlot, SecurityPolicyContext};

/// Builds the criteria used to look up the issuer's signing credentials.
fn signing_criteria(issuer: &str, context: &SecurityPolicyContext<'_>) -> CriteriaSet {
    let mut criteria = CriteriaSet::new()
        .with(Criterion::EntityId(issuer.to_string()))
        .with(Criterion::Usage(UsageType::Signing));
    if let Some(role) = context.slot(ContextSlot::PeerEntityRole) {
        criteria.add(Criterion::EntityRole(role.to_string()));
    }
    if let Some(protocol) = context.slot(ContextSlot::Protocol) {
        criteria.add(Criterion::Protocol(protocol.to_string()));
    }
    criteria
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use aws_lc_rs::rand::SystemRandom;
    use aws_lc_rs::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING};

    use crate::credential::{Credential, KeyAlgorithm, PublicKey, UsageType};
    use crate::resolver::{CredentialResolver, StaticCredentialResolver};
    use crate::trust::{ExplicitKeyTrustEngine, PublicKeySignatureVerifier, SignatureTrustEngine};

    pub struct Signer {
        key: EcdsaKeyPair,
    }

    impl Signer {
        pub fn new() -> Self {
            Self {
                key: EcdsaKeyPair::generate(&ECDSA_P256_SHA256_FIXED_SIGNING).unwrap(),
            }
        }

        pub fn sign(&self, data: &[u8]) -> Vec<u8> {
            self.key.sign(&SystemRandom::new(), data).unwrap().as_ref().to_vec()
        }

        pub fn credential(&self, entity_id: &str) -> Credential {
            Credential::builder()
                .entity_id(entity_id)
                .usage(UsageType::Signing)
                .public_key(PublicKey::new(
                    KeyAlgorithm::Ec,
                    self.key.public_key().as_ref().to_vec(),
                ))
                .build()
                .unwrap()
        }
    }

    pub fn signature_engine(trusted: Vec<Credential>) -> Arc<SignatureTrustEngine> {
        let resolver: Arc<dyn CredentialResolver> = Arc::new(StaticCredentialResolver::new(trusted));
        Arc::new(SignatureTrustEngine::new(
            Arc::clone(&resolver),
            Arc::new(PublicKeySignatureVerifier::new()),
            Arc::new(ExplicitKeyTrustEngine::new(resolver)),
        ))
    }
}
