//! # kc-crypto
//!
//! Cryptographic primitives for the SAML trust core, using aws-lc-rs.
//!
//! Only the verification side lives here: XML canonicalization and signature
//! construction belong to the XML layer. This crate maps XML-DSig algorithm
//! URIs to verification algorithms and checks raw signature octets against a
//! public key.
//!
//! ## NIST 800-53 Rev5 Controls
//!
//! - SC-13: Cryptographic protection

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod algorithm;
pub mod hash;
pub mod random;
pub mod signature;

pub use algorithm::SignatureAlgorithm;
pub use hash::sha1;
pub use random::random_bytes;
pub use signature::{verify_signature, SignatureError};
