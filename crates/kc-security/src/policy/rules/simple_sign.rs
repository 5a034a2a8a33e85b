use std::sync::Arc;

use base64::Engine;
use tracing::debug;

use super::signing_criteria;
use crate::error::{SecurityError, SecurityResult};
use crate::policy::{SecurityPolicyContext, SecurityPolicyRule, TransportFacts};
use crate::trust::{SignatureTrustEngine, SignedContent};

const MESSAGE_PARAMETERS: [&str; 2] = ["SAMLRequest", "SAMLResponse"];
const RELAY_STATE: &str = "RelayState";
const SIG_ALG: &str = "SigAlg";
const SIGNATURE: &str = "Signature";

/// Authenticates the issuer of a message signed at the binding layer
/// (HTTP-Redirect query signature or HTTP-POST-SimpleSign).
///
/// Applies only when the request carries both `Signature` and `SigAlg`.
#[derive(Debug, Clone)]
pub struct SimpleSignatureRule {
    engine: Arc<SignatureTrustEngine>,
}

impl SimpleSignatureRule {
    const NAME: &'static str = "simple-signature";

    /// Creates a rule backed by `engine`.
    #[must_use]
    pub fn new(engine: Arc<SignatureTrustEngine>) -> Self {
        Self { engine }
    }

    /// Rebuilds the signed octets.
    ///
    /// From the raw query the URL-encoded values are used exactly as
    /// received; without one (POST-SimpleSign) the decoded form values are.
    fn signed_octets(transport: &TransportFacts) -> Option<String> {
        match transport.raw_query() {
            Some(query) => build_octets(|name| {
                query.split('&').find_map(|pair| {
                    let (key, value) = pair.split_once('=')?;
                    (key == name).then_some(value)
                })
            }),
            None => build_octets(|name| transport.parameter(name)),
        }
    }
}

fn build_octets<'v>(lookup: impl Fn(&str) -> Option<&'v str>) -> Option<String> {
    let (name, message) = MESSAGE_PARAMETERS
        .iter()
        .find_map(|name| lookup(name).map(|value| (*name, value)))?;

    let mut octets = format!("{name}={message}");
    if let Some(relay_state) = lookup(RELAY_STATE) {
        octets.push_str(&format!("&{RELAY_STATE}={relay_state}"));
    }
    octets.push_str(&format!("&{SIG_ALG}={}", lookup(SIG_ALG)?));
    Some(octets)
}

impl SecurityPolicyRule for SimpleSignatureRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate(&self, context: &mut SecurityPolicyContext<'_>) -> SecurityResult<()> {
        let transport = context.transport();
        let (Some(signature), Some(algorithm)) =
            (transport.parameter(SIGNATURE), transport.parameter(SIG_ALG))
        else {
            debug!("Request carries no binding signature");
            return Ok(());
        };

        let Some(issuer) = context.issuer() else {
            return Err(SecurityError::rejected(
                Self::NAME,
                "signed request has no issuer to validate against",
            ));
        };

        let Some(octets) = Self::signed_octets(transport) else {
            return Err(SecurityError::rejected(
                Self::NAME,
                "signed request is missing the protocol message parameter",
            ));
        };

        let cleaned: String = signature.chars().filter(|c| !c.is_whitespace()).collect();
        let signature = base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .map_err(|e| SecurityError::rejected(Self::NAME, format!("invalid signature encoding: {e}")))?;

        let content = SignedContent {
            content: octets.as_bytes(),
            signature: &signature,
            algorithm,
        };
        let criteria = signing_criteria(issuer, context);

        if !self.engine.validate(&content, None, &criteria)? {
            return Err(SecurityError::rejected(
                Self::NAME,
                format!("binding signature of request from '{issuer}' is not trusted"),
            ));
        }

        debug!(issuer, "Binding signature trusted");
        context.set_issuer_authenticated(true);
        Ok(())
    }
}
