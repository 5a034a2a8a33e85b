//! Read-only facts about the inbound transport.

use std::collections::BTreeMap;

use crate::credential::X509Certificate;

/// Inbound transport facts consumed by policy rules.
///
/// Populated by the binding layer; rules never modify it.
#[derive(Debug, Clone, Default)]
pub struct TransportFacts {
    method: Option<String>,
    scheme: Option<String>,
    content_type: Option<String>,
    character_encoding: Option<String>,
    secure: bool,
    peer_address: Option<String>,
    peer_certificates: Vec<X509Certificate>,
    parameters: BTreeMap<String, String>,
    raw_query: Option<String>,
}

impl TransportFacts {
    /// Creates empty transport facts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Sets the URL scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Sets the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the character encoding.
    #[must_use]
    pub fn with_character_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.character_encoding = Some(encoding.into());
        self
    }

    /// Marks the transport as secure (TLS).
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Sets the peer network address.
    #[must_use]
    pub fn with_peer_address(mut self, address: impl Into<String>) -> Self {
        self.peer_address = Some(address.into());
        self
    }

    /// Sets the TLS client certificate chain, entity certificate first.
    #[must_use]
    pub fn with_peer_certificates(mut self, chain: Vec<X509Certificate>) -> Self {
        self.peer_certificates = chain;
        self
    }

    /// Adds a URL-decoded request parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Sets the raw, still URL-encoded query string.
    #[must_use]
    pub fn with_raw_query(mut self, query: impl Into<String>) -> Self {
        self.raw_query = Some(query.into());
        self
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Returns the URL scheme.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Returns the content type.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the character encoding.
    #[must_use]
    pub fn character_encoding(&self) -> Option<&str> {
        self.character_encoding.as_deref()
    }

    /// Returns whether the transport is secure.
    #[must_use]
    pub const fn is_secure(&self) -> bool {
        self.secure
    }

    /// Returns the peer network address.
    #[must_use]
    pub fn peer_address(&self) -> Option<&str> {
        self.peer_address.as_deref()
    }

    /// Returns the TLS client certificate chain.
    #[must_use]
    pub fn peer_certificates(&self) -> &[X509Certificate] {
        &self.peer_certificates
    }

    /// Returns a URL-decoded request parameter.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Returns the raw query string.
    #[must_use]
    pub fn raw_query(&self) -> Option<&str> {
        self.raw_query.as_deref()
    }
}
