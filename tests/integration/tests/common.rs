//! Common test utilities and fixtures.

use std::sync::Arc;

use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING};
use chrono::Utc;
use kc_cache::{InMemoryStorageService, ReplayCache};
use kc_core::{EventListener, FixedClock, SecurityConfig, SecurityEvent};
use kc_protocol_saml::InboundPolicyFactory;
use kc_security::{
    Credential, CredentialResolver, ExplicitKeyTrustEngine, KeyAlgorithm, PublicKey,
    PublicKeySignatureVerifier, SignatureTrustEngine, StaticCredentialResolver, UsageType,
};
use parking_lot::Mutex;

/// Installs a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("kc_security=debug,kc_protocol_saml=debug,kc_cache=debug")
        .with_test_writer()
        .try_init();
}

/// Collects every emitted event.
#[derive(Debug, Default)]
pub struct Recorder {
    events: Mutex<Vec<SecurityEvent>>,
}

impl EventListener for Recorder {
    fn on_event(&self, event: &SecurityEvent) {
        self.events.lock().push(event.clone());
    }
}

impl Recorder {
    /// Returns a copy of the events seen so far.
    pub fn events(&self) -> Vec<SecurityEvent> {
        self.events.lock().clone()
    }
}

/// A peer holding a P-256 signing key.
pub struct Peer {
    pub entity_id: String,
    key: EcdsaKeyPair,
}

impl Peer {
    pub fn new(entity_id: &str) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            key: EcdsaKeyPair::generate(&ECDSA_P256_SHA256_FIXED_SIGNING).unwrap(),
        }
    }

    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        self.key.sign(&SystemRandom::new(), data).unwrap().as_ref().to_vec()
    }

    /// The credential a relying party would load from this peer's metadata.
    pub fn credential(&self) -> Credential {
        Credential::builder()
            .entity_id(&self.entity_id)
            .usage(UsageType::Signing)
            .public_key(PublicKey::new(KeyAlgorithm::Ec, self.key.public_key().as_ref().to_vec()))
            .build()
            .unwrap()
    }
}

/// Everything an inbound endpoint needs, wired over in-memory storage.
pub struct TestEnv {
    pub clock: Arc<FixedClock>,
    pub storage: Arc<InMemoryStorageService>,
    pub recorder: Arc<Recorder>,
    pub factory: InboundPolicyFactory,
}

impl TestEnv {
    /// Creates an environment trusting the signing keys of `peers`.
    pub fn new(peers: &[&Peer]) -> Self {
        init_tracing();

        let clock = Arc::new(FixedClock::new(Utc::now()));
        let storage = Arc::new(InMemoryStorageService::new(clock.clone()));
        let recorder = Arc::new(Recorder::default());

        let resolver: Arc<dyn CredentialResolver> = Arc::new(StaticCredentialResolver::new(
            peers.iter().map(|peer| peer.credential()).collect(),
        ));
        let engine = Arc::new(SignatureTrustEngine::new(
            Arc::clone(&resolver),
            Arc::new(PublicKeySignatureVerifier::new()),
            Arc::new(ExplicitKeyTrustEngine::new(resolver)),
        ));

        let factory = InboundPolicyFactory::new(
            SecurityConfig::default(),
            clock.clone(),
            ReplayCache::new(storage.clone()),
            engine,
        )
        .with_listener(recorder.clone());

        Self {
            clock,
            storage,
            recorder,
            factory,
        }
    }
}
