//! # kc-security
//!
//! Trust evaluation and security policy enforcement for inbound SAML
//! protocol messages.
//!
//! ## Trust
//!
//! - [`Credential`] / [`CriteriaSet`] - Key material and the criteria used to select it
//! - [`CredentialResolver`] - Produces candidate trusted credentials
//! - [`TrustEngine`] - Decides whether a presented key or certificate is trusted
//! - [`SignatureTrustEngine`] - Checks that a signature was made with a trusted key
//!
//! ## Policy
//!
//! - [`SecurityPolicy`] - Ordered, fail-fast pipeline of [`SecurityPolicyRule`]s
//! - [`SecurityPolicyContext`] - Facts gathered while evaluating one message
//! - [`rules`] - The rule catalogue (transport, lifetime, replay, issuer, signatures)
//!
//! Trust engines and rules hold no per-message state and can be shared
//! across request threads; everything learned about a message lives in the
//! context created by [`SecurityPolicy::evaluate`].
//!
//! ## Example
//!
//! ```ignore
//! use kc_security::rules::{HttpRule, MessageInfoRule, MessageLifetimeRule};
//! use kc_security::SecurityPolicy;
//!
//! let policy = SecurityPolicy::builder("inbound-post")
//!     .rule(HttpRule::new().with_method("POST"))
//!     .rule(MessageInfoRule)
//!     .rule(MessageLifetimeRule::new(clock))
//!     .build()?;
//!
//! let context = policy.evaluate(&transport, &message)?;
//! tracing::info!(issuer = context.issuer(), "message accepted");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credential;
pub mod criteria;
pub mod error;
pub mod policy;
pub mod resolver;
pub mod trust;

pub use credential::{
    Credential, CredentialBuilder, KeyAlgorithm, PrivateKey, PublicKey, SecretKey, UsageType,
    X509Certificate,
};
pub use criteria::{CriteriaSet, Criterion, CriterionKind};
pub use error::{SecurityError, SecurityResult};
pub use policy::rules;
pub use policy::{
    ContextInitializer, ContextSlot, MessageFacts, MessageSignature, ProtocolMessage,
    SecurityPolicy, SecurityPolicyBuilder, SecurityPolicyContext, SecurityPolicyResolver,
    SecurityPolicyRule, StaticSecurityPolicyResolver, TransportFacts,
};
pub use resolver::{
    ChainingCredentialResolver, CredentialResolver, Credentials, StaticCredentialResolver,
};
pub use trust::{
    CertificateEvaluator, ChainingTrustEngine, ExactCertificateEvaluator,
    ExplicitKeyTrustEngine, ExplicitX509CertificateTrustEngine, PublicKeySignatureVerifier,
    SignatureTrustEngine, SignatureVerifier, SignedContent, TokenKind, TrustEngine, TrustToken,
};
