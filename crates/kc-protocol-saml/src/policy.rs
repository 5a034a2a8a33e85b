//! SAML inbound security policies.
//!
//! Wires the generic rule catalogue into the policies a SAML endpoint
//! applies per binding, and seeds each evaluation with the SAML facts the
//! signature rules use to narrow credential lookup.

use std::sync::Arc;

use kc_cache::ReplayCache;
use kc_core::{Clock, EventListener, SecurityConfig, TracingEventListener};
use kc_security::rules::{
    HttpRule, MandatoryAuthenticatedMessageRule, MandatoryIssuerRule, MessageInfoRule,
    MessageLifetimeRule, MessageReplayRule, MessageSignatureRule, SimpleSignatureRule,
};
use kc_security::{
    ContextInitializer, ContextSlot, SecurityPolicy, SecurityPolicyContext, SecurityResult,
    SignatureTrustEngine,
};

use crate::constants::{SamlBinding, SAML20P_NS};

/// Seeds the peer role, protocol and inbound binding slots.
#[derive(Debug, Clone)]
pub struct SamlContextInitializer {
    peer_role: String,
    binding: SamlBinding,
}

impl SamlContextInitializer {
    /// Creates an initializer for messages from a peer acting in `peer_role`.
    #[must_use]
    pub fn new(peer_role: impl Into<String>, binding: SamlBinding) -> Self {
        Self {
            peer_role: peer_role.into(),
            binding,
        }
    }
}

impl ContextInitializer for SamlContextInitializer {
    fn initialize(&self, context: &mut SecurityPolicyContext<'_>) {
        context.set_slot(ContextSlot::PeerEntityRole, self.peer_role.as_str());
        context.set_slot(ContextSlot::Protocol, SAML20P_NS);
        context.set_slot(ContextSlot::InboundBinding, self.binding.uri());
        if let Some(relay_state) = context.transport().parameter("RelayState") {
            context.set_slot(ContextSlot::RelayState, relay_state);
        }
    }
}

/// Collaborators shared by every standard inbound policy.
#[derive(Debug, Clone)]
pub struct InboundPolicyFactory {
    config: SecurityConfig,
    clock: Arc<dyn Clock>,
    replay_cache: ReplayCache,
    signature_engine: Arc<SignatureTrustEngine>,
    listener: Arc<dyn EventListener>,
    require_authenticated: bool,
}

impl InboundPolicyFactory {
    /// Creates a factory.
    #[must_use]
    pub fn new(
        config: SecurityConfig,
        clock: Arc<dyn Clock>,
        replay_cache: ReplayCache,
        signature_engine: Arc<SignatureTrustEngine>,
    ) -> Self {
        Self {
            config,
            clock,
            replay_cache,
            signature_engine,
            listener: Arc::new(TracingEventListener),
            require_authenticated: false,
        }
    }

    /// Sets the event listener passed to every policy.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn EventListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Requires every message to end up with an authenticated issuer.
    #[must_use]
    pub fn require_authenticated(mut self, required: bool) -> Self {
        self.require_authenticated = required;
        self
    }

    /// Builds the policy for messages from `peer_role` over `binding`.
    ///
    /// Rules run as: transport, message info, mandatory issuer, lifetime,
    /// replay, then the signature checks the binding supports.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the policy cannot be assembled.
    pub fn policy(&self, peer_role: &str, binding: SamlBinding) -> SecurityResult<SecurityPolicy> {
        let mut http = HttpRule::new().with_method(binding.http_method());
        if binding == SamlBinding::Soap {
            http = http.with_content_type("text/xml");
        }

        let mut builder = SecurityPolicy::builder(format!("{peer_role}:{}", binding.uri()))
            .initializer(SamlContextInitializer::new(peer_role, binding))
            .listener(Arc::clone(&self.listener))
            .rule(http)
            .rule(MessageInfoRule)
            .rule(MandatoryIssuerRule)
            .rule(MessageLifetimeRule::from_config(Arc::clone(&self.clock), &self.config))
            .rule(MessageReplayRule::from_config(
                self.replay_cache.clone(),
                Arc::clone(&self.clock),
                &self.config,
            ));

        match binding {
            SamlBinding::HttpRedirect => {
                builder = builder.rule(SimpleSignatureRule::new(Arc::clone(&self.signature_engine)));
            }
            SamlBinding::HttpPostSimpleSign => {
                builder = builder
                    .rule(MessageSignatureRule::new(Arc::clone(&self.signature_engine)))
                    .rule(SimpleSignatureRule::new(Arc::clone(&self.signature_engine)));
            }
            SamlBinding::HttpPost | SamlBinding::HttpArtifact | SamlBinding::Soap => {
                builder = builder.rule(MessageSignatureRule::new(Arc::clone(&self.signature_engine)));
            }
        }

        if self.require_authenticated {
            builder = builder.rule(MandatoryAuthenticatedMessageRule);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use kc_cache::InMemoryStorageService;
    use kc_core::{FixedClock, NoopEventListener};
    use kc_security::{
        CredentialResolver, ExplicitKeyTrustEngine, MessageFacts, PublicKeySignatureVerifier,
        StaticCredentialResolver, TransportFacts,
    };

    use super::*;
    use crate::constants::roles;

    fn factory() -> InboundPolicyFactory {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let storage = Arc::new(InMemoryStorageService::new(clock.clone()));
        let resolver: Arc<dyn CredentialResolver> = Arc::new(StaticCredentialResolver::default());
        let engine = Arc::new(SignatureTrustEngine::new(
            Arc::clone(&resolver),
            Arc::new(PublicKeySignatureVerifier::new()),
            Arc::new(ExplicitKeyTrustEngine::new(resolver)),
        ));
        InboundPolicyFactory::new(SecurityConfig::default(), clock, ReplayCache::new(storage), engine)
            .with_listener(Arc::new(NoopEventListener))
    }

    #[test]
    fn initializer_seeds_saml_slots() {
        let transport = TransportFacts::new().with_parameter("RelayState", "abc");
        let message = MessageFacts::new();
        let mut context = SecurityPolicyContext::new(&transport, &message);

        SamlContextInitializer::new(roles::SP_SSO_DESCRIPTOR, SamlBinding::HttpRedirect)
            .initialize(&mut context);

        assert_eq!(context.slot(ContextSlot::PeerEntityRole), Some("SPSSODescriptor"));
        assert_eq!(context.slot(ContextSlot::Protocol), Some(SAML20P_NS));
        assert_eq!(
            context.slot(ContextSlot::InboundBinding),
            Some("urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect")
        );
        assert_eq!(context.slot(ContextSlot::RelayState), Some("abc"));
    }

    #[test]
    fn rule_order_per_binding() {
        let names = |policy: &SecurityPolicy| -> Vec<&'static str> {
            policy.rules().iter().map(|r| r.name()).collect()
        };

        let redirect = factory().policy(roles::SP_SSO_DESCRIPTOR, SamlBinding::HttpRedirect).unwrap();
        assert_eq!(
            names(&redirect),
            vec![
                "http",
                "message-info",
                "mandatory-issuer",
                "message-lifetime",
                "message-replay",
                "simple-signature"
            ]
        );

        let soap = factory()
            .require_authenticated(true)
            .policy(roles::SP_SSO_DESCRIPTOR, SamlBinding::Soap)
            .unwrap();
        assert_eq!(
            names(&soap).last().copied(),
            Some("mandatory-authenticated-message")
        );
        assert!(names(&soap).contains(&"message-signature"));
    }
}
