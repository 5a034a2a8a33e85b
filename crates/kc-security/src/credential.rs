//! Credentials: an entity's key material.
//!
//! A [`Credential`] is built by a resolver for one lookup and is never
//! persisted. It carries either asymmetric material (public and/or private
//! key, optional certificate chain) or a shared secret key, never both.

use std::collections::BTreeSet;
use std::fmt;

use base64::Engine;

use crate::error::{SecurityError, SecurityResult};

/// Intended use of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UsageType {
    /// Signing and signature verification.
    Signing,
    /// Encryption and decryption.
    Encryption,
    /// Any use.
    #[default]
    Unspecified,
}

impl UsageType {
    /// Returns whether a credential with this usage may serve `requested`.
    ///
    /// `Unspecified` on either side matches anything.
    #[must_use]
    pub fn permits(self, requested: Self) -> bool {
        self == Self::Unspecified || requested == Self::Unspecified || self == requested
    }
}

/// Public key algorithm family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// RSA keys.
    Rsa,
    /// Elliptic curve keys.
    Ec,
}

/// A public key in its encoded form.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    algorithm: KeyAlgorithm,
    encoded: Vec<u8>,
}

impl PublicKey {
    /// Wraps an encoded public key.
    #[must_use]
    pub fn new(algorithm: KeyAlgorithm, encoded: impl Into<Vec<u8>>) -> Self {
        Self {
            algorithm,
            encoded: encoded.into(),
        }
    }

    /// Returns the algorithm family.
    #[must_use]
    pub const fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Returns the encoded key bytes.
    #[must_use]
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("algorithm", &self.algorithm)
            .field("len", &self.encoded.len())
            .finish()
    }
}

/// A PKCS#8 private key. Never printed.
#[derive(Clone)]
pub struct PrivateKey(Vec<u8>);

impl PrivateKey {
    /// Wraps PKCS#8 DER bytes.
    #[must_use]
    pub fn from_pkcs8(der: impl Into<Vec<u8>>) -> Self {
        Self(der.into())
    }

    /// Returns the PKCS#8 DER bytes.
    #[must_use]
    pub fn pkcs8(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

/// A shared symmetric key. Never printed; compared in constant time.
#[derive(Clone)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Wraps raw key bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        #[allow(deprecated)]
        aws_lc_rs::constant_time::verify_slices_are_equal(&self.0, &other.0).is_ok()
    }
}

impl Eq for SecretKey {}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

/// A DER-encoded X.509 certificate.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct X509Certificate(Vec<u8>);

impl X509Certificate {
    /// Wraps DER bytes.
    #[must_use]
    pub fn from_der(der: impl Into<Vec<u8>>) -> Self {
        Self(der.into())
    }

    /// Decodes the base64 content of a `<ds:X509Certificate>` element.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid base64.
    pub fn from_base64(text: &str) -> SecurityResult<Self> {
        let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .map(Self)
            .map_err(|e| SecurityError::InvalidCredential(format!("invalid certificate encoding: {e}")))
    }

    /// Returns the DER bytes.
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for X509Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X509Certificate({} bytes)", self.0.len())
    }
}

/// An entity's cryptographic material.
#[derive(Debug, Clone)]
pub struct Credential {
    entity_id: Option<String>,
    usage: UsageType,
    public_key: Option<PublicKey>,
    private_key: Option<PrivateKey>,
    secret_key: Option<SecretKey>,
    key_names: BTreeSet<String>,
    certificate_chain: Vec<X509Certificate>,
}

impl Credential {
    /// Creates a new credential builder.
    #[must_use]
    pub fn builder() -> CredentialBuilder {
        CredentialBuilder::default()
    }

    /// Returns the owning entity ID.
    #[must_use]
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Returns the intended usage.
    #[must_use]
    pub const fn usage(&self) -> UsageType {
        self.usage
    }

    /// Returns the public key.
    #[must_use]
    pub const fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }

    /// Returns the private key.
    #[must_use]
    pub const fn private_key(&self) -> Option<&PrivateKey> {
        self.private_key.as_ref()
    }

    /// Returns the secret key.
    #[must_use]
    pub const fn secret_key(&self) -> Option<&SecretKey> {
        self.secret_key.as_ref()
    }

    /// Returns the key names.
    #[must_use]
    pub const fn key_names(&self) -> &BTreeSet<String> {
        &self.key_names
    }

    /// Returns the certificate chain, entity certificate first.
    #[must_use]
    pub fn certificate_chain(&self) -> &[X509Certificate] {
        &self.certificate_chain
    }

    /// Returns the entity certificate.
    #[must_use]
    pub fn entity_certificate(&self) -> Option<&X509Certificate> {
        self.certificate_chain.first()
    }
}

/// Builder for [`Credential`].
#[derive(Debug, Default)]
pub struct CredentialBuilder {
    entity_id: Option<String>,
    usage: UsageType,
    public_key: Option<PublicKey>,
    private_key: Option<PrivateKey>,
    secret_key: Option<SecretKey>,
    key_names: BTreeSet<String>,
    certificate_chain: Vec<X509Certificate>,
}

impl CredentialBuilder {
    /// Sets the owning entity ID.
    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Sets the usage.
    #[must_use]
    pub fn usage(mut self, usage: UsageType) -> Self {
        self.usage = usage;
        self
    }

    /// Sets the public key.
    #[must_use]
    pub fn public_key(mut self, key: PublicKey) -> Self {
        self.public_key = Some(key);
        self
    }

    /// Sets the private key.
    #[must_use]
    pub fn private_key(mut self, key: PrivateKey) -> Self {
        self.private_key = Some(key);
        self
    }

    /// Sets the secret key.
    #[must_use]
    pub fn secret_key(mut self, key: SecretKey) -> Self {
        self.secret_key = Some(key);
        self
    }

    /// Adds a key name.
    #[must_use]
    pub fn key_name(mut self, name: impl Into<String>) -> Self {
        self.key_names.insert(name.into());
        self
    }

    /// Sets the certificate chain, entity certificate first.
    #[must_use]
    pub fn certificate_chain(mut self, chain: Vec<X509Certificate>) -> Self {
        self.certificate_chain = chain;
        self
    }

    /// Builds the credential.
    ///
    /// # Errors
    ///
    /// Returns an error if a secret key is combined with asymmetric keys.
    pub fn build(self) -> SecurityResult<Credential> {
        if self.secret_key.is_some() && (self.public_key.is_some() || self.private_key.is_some())
        {
            return Err(SecurityError::InvalidCredential(
                "a credential cannot hold both a secret key and a public/private key".to_string(),
            ));
        }

        Ok(Credential {
            entity_id: self.entity_id,
            usage: self.usage,
            public_key: self.public_key,
            private_key: self.private_key,
            secret_key: self.secret_key,
            key_names: self.key_names,
            certificate_chain: self.certificate_chain,
        })
    }
}
