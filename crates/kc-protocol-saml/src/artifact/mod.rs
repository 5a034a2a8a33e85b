//! SAML artifact binding support.
//!
//! - [`Saml2Artifact`] - the type 0x0004 artifact format
//! - [`ArtifactMap`] - expiring, single-use message store keyed by artifact
//! - [`ArtifactIssuer`] and [`ArtifactResolver`] - both ends of the exchange

mod entry;
mod issuer;
mod map;
mod resolution;
mod serializer;
mod token;

pub use entry::ArtifactMapEntry;
pub use issuer::ArtifactIssuer;
pub use map::{ArtifactMap, StorageArtifactMap, StorageArtifactMapBuilder, ARTIFACT_MAP_PARTITION};
pub use resolution::ArtifactResolver;
pub use serializer::{JsonMessageSerializer, MessageSerializer, XmlMessageSerializer};
pub use token::Saml2Artifact;
