//! The view of a protocol message that policy rules need.
//!
//! Parsing and canonicalization live in the XML layer; rules only see the
//! facts exposed here.

use chrono::{DateTime, Utc};

use crate::credential::Credential;
use crate::trust::SignedContent;

/// An enveloped XML signature, already canonicalized by the XML layer.
#[derive(Debug, Clone)]
pub struct MessageSignature {
    /// XML-DSig signature algorithm URI.
    pub algorithm: String,
    /// Canonical `SignedInfo` octets.
    pub signed_info: Vec<u8>,
    /// Decoded `SignatureValue`.
    pub value: Vec<u8>,
    /// Credential built from the signature's `KeyInfo`, if any.
    pub key_info: Option<Credential>,
}

impl MessageSignature {
    /// Returns the signed octets in the form the trust engine consumes.
    #[must_use]
    pub fn signed_content(&self) -> SignedContent<'_> {
        SignedContent {
            content: &self.signed_info,
            signature: &self.value,
            algorithm: &self.algorithm,
        }
    }
}

/// An inbound protocol message.
pub trait ProtocolMessage: Send + Sync {
    /// Returns the message ID.
    fn message_id(&self) -> Option<&str>;

    /// Returns the issuer entity ID.
    fn issuer(&self) -> Option<&str>;

    /// Returns the issue instant.
    fn issue_instant(&self) -> Option<DateTime<Utc>>;

    /// Returns the enveloped signature, if the message is signed.
    fn signature(&self) -> Option<&MessageSignature> {
        None
    }
}

/// Plain [`ProtocolMessage`] carrying facts extracted by the XML layer.
#[derive(Debug, Clone, Default)]
pub struct MessageFacts {
    message_id: Option<String>,
    issuer: Option<String>,
    issue_instant: Option<DateTime<Utc>>,
    signature: Option<MessageSignature>,
}

impl MessageFacts {
    /// Creates empty message facts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message ID.
    #[must_use]
    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    /// Sets the issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets the issue instant.
    #[must_use]
    pub fn with_issue_instant(mut self, instant: DateTime<Utc>) -> Self {
        self.issue_instant = Some(instant);
        self
    }

    /// Sets the signature.
    #[must_use]
    pub fn with_signature(mut self, signature: MessageSignature) -> Self {
        self.signature = Some(signature);
        self
    }
}

impl ProtocolMessage for MessageFacts {
    fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    fn issue_instant(&self) -> Option<DateTime<Utc>> {
        self.issue_instant
    }

    fn signature(&self) -> Option<&MessageSignature> {
        self.signature.as_ref()
    }
}
