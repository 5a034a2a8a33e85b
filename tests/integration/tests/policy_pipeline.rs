//! Inbound policy pipeline tests.

use base64::Engine;
use chrono::Duration;
use kc_core::{Clock, EventOutcome, EventType};
use kc_crypto::algorithm::ECDSA_SHA256;
use kc_protocol_saml::constants::roles;
use kc_protocol_saml::SamlBinding;
use kc_security::{ContextSlot, MessageFacts, MessageSignature, SecurityError, TransportFacts};

use crate::common::{Peer, TestEnv};

const SP: &str = "https://sp.example.org";

fn post_transport() -> TransportFacts {
    TransportFacts::new()
        .with_method("POST")
        .with_scheme("https")
        .with_secure(true)
        .with_content_type("application/x-www-form-urlencoded")
        .with_parameter("RelayState", "state-1")
}

fn signed_request(env: &TestEnv, peer: &Peer, id: &str) -> MessageFacts {
    let signed_info = format!("<ds:SignedInfo><ds:Reference URI=\"#{id}\"/></ds:SignedInfo>").into_bytes();
    let value = peer.sign(&signed_info);
    MessageFacts::new()
        .with_message_id(id)
        .with_issuer(&peer.entity_id)
        .with_issue_instant(env.clock.now())
        .with_signature(MessageSignature {
            algorithm: ECDSA_SHA256.to_string(),
            signed_info,
            value,
            key_info: None,
        })
}

#[test]
fn signed_post_request_is_accepted() -> anyhow::Result<()> {
    let sp = Peer::new(SP);
    let env = TestEnv::new(&[&sp]);
    let policy = env.factory.policy(roles::SP_SSO_DESCRIPTOR, SamlBinding::HttpPost)?;

    let transport = post_transport();
    let message = signed_request(&env, &sp, "_a1");
    let context = policy.evaluate(&transport, &message)?;

    assert_eq!(context.issuer(), Some(SP));
    assert_eq!(context.message_id(), Some("_a1"));
    assert!(context.is_issuer_authenticated());
    assert_eq!(context.slot(ContextSlot::RelayState), Some("state-1"));
    assert_eq!(context.slot(ContextSlot::PeerEntityRole), Some(roles::SP_SSO_DESCRIPTOR));

    let events = env.recorder.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventType::PolicyAccepted);
    assert_eq!(events[0].issuer.as_deref(), Some(SP));
    Ok(())
}

#[test]
fn wrong_method_fails_fast() -> anyhow::Result<()> {
    let sp = Peer::new(SP);
    let env = TestEnv::new(&[&sp]);
    let policy = env.factory.policy(roles::SP_SSO_DESCRIPTOR, SamlBinding::HttpPost)?;

    let transport = post_transport().with_method("GET");
    let message = signed_request(&env, &sp, "_a1");
    let err = policy.evaluate(&transport, &message).unwrap_err();

    match &err {
        SecurityError::PolicyRejected { rule, reason } => {
            assert_eq!(*rule, "http");
            assert!(reason.contains("POST") && reason.contains("GET"), "{reason}");
        }
        other => panic!("unexpected error: {other}"),
    }

    // The replay rule never ran, so the same message is still fresh.
    let transport = post_transport();
    let context = policy.evaluate(&transport, &message)?;
    assert_eq!(context.message_id(), Some("_a1"));

    let events = env.recorder.events();
    assert_eq!(events[0].event_type, EventType::PolicyRejected);
    assert_eq!(events[0].outcome, EventOutcome::Failure);
    Ok(())
}

#[test]
fn replayed_message_is_rejected() -> anyhow::Result<()> {
    let sp = Peer::new(SP);
    let env = TestEnv::new(&[&sp]);
    let policy = env.factory.policy(roles::SP_SSO_DESCRIPTOR, SamlBinding::HttpPost)?;

    let transport = post_transport();
    let message = signed_request(&env, &sp, "_replayed");
    policy.evaluate(&transport, &message)?;

    env.clock.advance(Duration::seconds(30));
    let err = policy.evaluate(&transport, &message).unwrap_err();
    assert!(matches!(err, SecurityError::PolicyRejected { rule: "message-replay", .. }));
    Ok(())
}

#[test]
fn stale_and_future_messages_are_rejected() -> anyhow::Result<()> {
    let sp = Peer::new(SP);
    let env = TestEnv::new(&[&sp]);
    let policy = env.factory.policy(roles::SP_SSO_DESCRIPTOR, SamlBinding::HttpPost)?;
    let transport = post_transport();

    let stale = signed_request(&env, &sp, "_stale");
    env.clock.advance(Duration::minutes(7));
    let err = policy.evaluate(&transport, &stale).unwrap_err();
    assert!(matches!(err, SecurityError::PolicyRejected { rule: "message-lifetime", .. }));

    let future = signed_request(&env, &sp, "_future")
        .with_issue_instant(env.clock.now() + Duration::minutes(10));
    let err = policy.evaluate(&transport, &future).unwrap_err();
    assert!(matches!(err, SecurityError::PolicyRejected { rule: "message-lifetime", .. }));

    // Within the skew window a slightly early message is fine.
    let early = signed_request(&env, &sp, "_early")
        .with_issue_instant(env.clock.now() + Duration::minutes(1));
    policy.evaluate(&transport, &early)?;
    Ok(())
}

#[test]
fn signature_from_untrusted_key_is_rejected() -> anyhow::Result<()> {
    let sp = Peer::new(SP);
    let impostor = Peer::new(SP);
    let env = TestEnv::new(&[&sp]);
    let policy = env.factory.policy(roles::SP_SSO_DESCRIPTOR, SamlBinding::HttpPost)?;

    let message = signed_request(&env, &impostor, "_forged");
    let err = policy.evaluate(&post_transport(), &message).unwrap_err();
    assert!(matches!(err, SecurityError::PolicyRejected { rule: "message-signature", .. }));
    assert_eq!(err.status_code(), "urn:oasis:names:tc:SAML:2.0:status:Requester");
    Ok(())
}

#[test]
fn unsigned_message_fails_when_authentication_is_required() -> anyhow::Result<()> {
    let sp = Peer::new(SP);
    let env = TestEnv::new(&[&sp]);
    let policy = env
        .factory
        .clone()
        .require_authenticated(true)
        .policy(roles::SP_SSO_DESCRIPTOR, SamlBinding::HttpPost)?;

    let message = MessageFacts::new()
        .with_message_id("_unsigned")
        .with_issuer(SP)
        .with_issue_instant(env.clock.now());
    let err = policy.evaluate(&post_transport(), &message).unwrap_err();
    assert!(matches!(
        err,
        SecurityError::PolicyRejected { rule: "mandatory-authenticated-message", .. }
    ));
    Ok(())
}

#[test]
fn redirect_binding_signature_is_checked_over_the_query() -> anyhow::Result<()> {
    let sp = Peer::new(SP);
    let env = TestEnv::new(&[&sp]);
    let policy = env.factory.policy(roles::SP_SSO_DESCRIPTOR, SamlBinding::HttpRedirect)?;

    let octets = format!("SAMLRequest=nZJdb4IwFIb&RelayState=xyz&SigAlg={}", ECDSA_SHA256);
    let signature = base64::engine::general_purpose::STANDARD.encode(sp.sign(octets.as_bytes()));
    let transport = TransportFacts::new()
        .with_method("GET")
        .with_parameter("SAMLRequest", "nZJdb4IwFIb")
        .with_parameter("RelayState", "xyz")
        .with_parameter("SigAlg", ECDSA_SHA256)
        .with_parameter("Signature", signature);
    let message = MessageFacts::new()
        .with_message_id("_redirect")
        .with_issuer(SP)
        .with_issue_instant(env.clock.now());

    let context = policy.evaluate(&transport, &message)?;
    assert!(context.is_issuer_authenticated());

    let tampered = transport.clone().with_parameter("RelayState", "other");
    let message = MessageFacts::new()
        .with_message_id("_redirect-2")
        .with_issuer(SP)
        .with_issue_instant(env.clock.now());
    let err = policy.evaluate(&tampered, &message).unwrap_err();
    assert!(matches!(err, SecurityError::PolicyRejected { rule: "simple-signature", .. }));
    Ok(())
}
