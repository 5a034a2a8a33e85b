use std::sync::Arc;

use tracing::debug;

use super::signing_criteria;
use crate::error::{SecurityError, SecurityResult};
use crate::policy::{SecurityPolicyContext, SecurityPolicyRule};
use crate::trust::SignatureTrustEngine;

/// Authenticates the issuer of an XML-signed message.
///
/// Unsigned messages pass untouched; a signed message must name its issuer
/// and carry a signature made with one of the issuer's trusted keys.
#[derive(Debug, Clone)]
pub struct MessageSignatureRule {
    engine: Arc<SignatureTrustEngine>,
}

impl MessageSignatureRule {
    const NAME: &'static str = "message-signature";

    /// Creates a rule backed by `engine`.
    #[must_use]
    pub fn new(engine: Arc<SignatureTrustEngine>) -> Self {
        Self { engine }
    }
}

impl SecurityPolicyRule for MessageSignatureRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate(&self, context: &mut SecurityPolicyContext<'_>) -> SecurityResult<()> {
        let Some(signature) = context.message().signature() else {
            debug!("Message is not signed");
            return Ok(());
        };

        let Some(issuer) = context.issuer() else {
            return Err(SecurityError::rejected(
                Self::NAME,
                "signed message has no issuer to validate against",
            ));
        };

        let criteria = signing_criteria(issuer, context);
        let trusted = self.engine.validate(
            &signature.signed_content(),
            signature.key_info.as_ref(),
            &criteria,
        )?;

        if !trusted {
            return Err(SecurityError::rejected(
                Self::NAME,
                format!("signature of message from '{issuer}' is not trusted"),
            ));
        }

        debug!(issuer, "Message signature trusted");
        context.set_issuer_authenticated(true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use kc_crypto::algorithm::ECDSA_SHA256;

    use super::super::test_support::{signature_engine, Signer};
    use super::*;
    use crate::policy::{MessageFacts, MessageSignature, ProtocolMessage, TransportFacts};

    fn signed_message(signer: &Signer, issuer: Option<&str>) -> MessageFacts {
        let signed_info = b"<ds:SignedInfo>...</ds:SignedInfo>".to_vec();
        let value = signer.sign(&signed_info);
        let message = MessageFacts::new().with_signature(MessageSignature {
            algorithm: ECDSA_SHA256.to_string(),
            signed_info,
            value,
            key_info: None,
        });
        match issuer {
            Some(issuer) => message.with_issuer(issuer),
            None => message,
        }
    }

    fn evaluate(rule: &MessageSignatureRule, message: &MessageFacts) -> (SecurityResult<()>, Option<bool>) {
        let transport = TransportFacts::new();
        let mut context = SecurityPolicyContext::new(&transport, message);
        context.set_issuer(message.issuer());
        let result = rule.evaluate(&mut context);
        (result, context.issuer_authenticated())
    }

    #[test]
    fn trusted_signature_authenticates_issuer() {
        let signer = Signer::new();
        let rule = MessageSignatureRule::new(signature_engine(vec![signer.credential("idp")]));

        let (result, authenticated) = evaluate(&rule, &signed_message(&signer, Some("idp")));
        assert!(result.is_ok());
        assert_eq!(authenticated, Some(true));
    }

    #[test]
    fn untrusted_signature_is_rejected() {
        let signer = Signer::new();
        let stranger = Signer::new();
        let rule = MessageSignatureRule::new(signature_engine(vec![signer.credential("idp")]));

        let (result, authenticated) = evaluate(&rule, &signed_message(&stranger, Some("idp")));
        assert!(result.unwrap_err().is_rejection());
        assert_eq!(authenticated, None);
    }

    #[test]
    fn key_of_another_entity_is_not_accepted() {
        let signer = Signer::new();
        let rule = MessageSignatureRule::new(signature_engine(vec![signer.credential("other-idp")]));

        let (result, _) = evaluate(&rule, &signed_message(&signer, Some("idp")));
        assert!(result.is_err());
    }

    #[test]
    fn signed_message_without_issuer_is_rejected() {
        let signer = Signer::new();
        let rule = MessageSignatureRule::new(signature_engine(vec![signer.credential("idp")]));

        let (result, _) = evaluate(&rule, &signed_message(&signer, None));
        assert!(result.unwrap_err().is_rejection());
    }

    #[test]
    fn unsigned_message_is_ignored() {
        let rule = MessageSignatureRule::new(signature_engine(Vec::new()));

        let (result, authenticated) = evaluate(&rule, &MessageFacts::new().with_issuer("idp"));
        assert!(result.is_ok());
        assert_eq!(authenticated, None);
    }
}
