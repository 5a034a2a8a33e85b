//! SAML 2.0 inbound security and artifact handling for Keycloak Rust.
//!
//! This crate binds the protocol-neutral policy engine in `kc-security` to
//! SAML 2.0:
//!
//! - **Inbound policies** - per-binding rule pipelines for peer messages
//! - **Artifact binding** - issuing, storing and resolving artifacts
//!
//! # Architecture
//!
//! - [`policy`] - context initialization and the inbound policy factory
//! - [`artifact`] - artifact format, map, issuer and resolver
//! - [`constants`] - namespaces, metadata roles and bindings
//! - [`error`] - error types for artifact operations
//!
//! # Example
//!
//! ```rust,ignore
//! use kc_protocol_saml::artifact::{ArtifactIssuer, ArtifactResolver};
//!
//! let artifact = issuer.issue("https://sp.example.org", &response)?;
//! // later, on the back channel
//! let response = resolver.resolve(&artifact, "https://sp.example.org")?;
//! ```
//!
//! # SAML Specifications
//!
//! - [SAML 2.0 Bindings](https://docs.oasis-open.org/security/saml/v2.0/saml-bindings-2.0-os.pdf)
//! - [SAML 2.0 Profiles](https://docs.oasis-open.org/security/saml/v2.0/saml-profiles-2.0-os.pdf)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod artifact;
pub mod constants;
pub mod error;
pub mod policy;

pub use artifact::{
    ArtifactIssuer, ArtifactMap, ArtifactMapEntry, ArtifactResolver, Saml2Artifact, StorageArtifactMap,
};
pub use constants::SamlBinding;
pub use error::{ArtifactError, ArtifactResult, ResolutionError};
pub use policy::{InboundPolicyFactory, SamlContextInitializer};
