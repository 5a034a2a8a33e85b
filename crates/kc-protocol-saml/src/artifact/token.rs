//! SAML 2.0 artifact tokens (type code `0x0004`).
//!
//! Layout: `TypeCode(2) | EndpointIndex(2) | SourceID(20) | MessageHandle(20)`,
//! base64 encoded. The source ID is the SHA-1 digest of the issuer's entity
//! ID and the message handle is 20 random bytes.

use std::fmt;

use base64::Engine;
use kc_crypto::{random_bytes, sha1};

use crate::error::{ArtifactError, ArtifactResult};

/// A type 0x0004 SAML 2.0 artifact.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Saml2Artifact {
    endpoint_index: u16,
    source_id: [u8; 20],
    message_handle: [u8; 20],
}

impl Saml2Artifact {
    /// The artifact type code.
    pub const TYPE_CODE: u16 = 0x0004;

    const LENGTH: usize = 44;

    /// Creates an artifact for `issuer_id` with a fresh random message handle.
    #[must_use]
    pub fn build(issuer_id: &str, endpoint_index: u16) -> Self {
        Self {
            endpoint_index,
            source_id: Self::source_id_for(issuer_id),
            message_handle: random_bytes::<20>(),
        }
    }

    /// Returns the source ID identifying `entity_id`.
    #[must_use]
    pub fn source_id_for(entity_id: &str) -> [u8; 20] {
        sha1(entity_id.as_bytes())
    }

    /// Parses a base64 encoded artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::InvalidArtifact`] if the value is not valid
    /// base64, has the wrong length, or carries another type code.
    pub fn parse(encoded: &str) -> ArtifactResult<Self> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
        if bytes.len() != Self::LENGTH {
            return Err(ArtifactError::InvalidArtifact(format!(
                "expected {} bytes, got {}",
                Self::LENGTH,
                bytes.len()
            )));
        }

        let type_code = u16::from_be_bytes([bytes[0], bytes[1]]);
        if type_code != Self::TYPE_CODE {
            return Err(ArtifactError::InvalidArtifact(format!(
                "unsupported type code {type_code:#06x}"
            )));
        }

        let mut source_id = [0u8; 20];
        source_id.copy_from_slice(&bytes[4..24]);
        let mut message_handle = [0u8; 20];
        message_handle.copy_from_slice(&bytes[24..44]);

        Ok(Self {
            endpoint_index: u16::from_be_bytes([bytes[2], bytes[3]]),
            source_id,
            message_handle,
        })
    }

    /// Returns the base64 encoded artifact.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut bytes = Vec::with_capacity(Self::LENGTH);
        bytes.extend_from_slice(&Self::TYPE_CODE.to_be_bytes());
        bytes.extend_from_slice(&self.endpoint_index.to_be_bytes());
        bytes.extend_from_slice(&self.source_id);
        bytes.extend_from_slice(&self.message_handle);
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    /// Returns the index of the issuer's artifact resolution endpoint.
    #[must_use]
    pub const fn endpoint_index(&self) -> u16 {
        self.endpoint_index
    }

    /// Returns the source ID.
    #[must_use]
    pub const fn source_id(&self) -> &[u8; 20] {
        &self.source_id
    }

    /// Returns the message handle.
    #[must_use]
    pub const fn message_handle(&self) -> &[u8; 20] {
        &self.message_handle
    }

    /// Returns whether this artifact was issued by `entity_id`.
    #[must_use]
    pub fn is_from(&self, entity_id: &str) -> bool {
        self.source_id == Self::source_id_for(entity_id)
    }
}

impl fmt::Display for Saml2Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Saml2Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Saml2Artifact")
            .field("endpoint_index", &self.endpoint_index)
            .finish_non_exhaustive()
    }
}
