//! Message (de)serialization for artifact map storage.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ArtifactError, ArtifactResult};

/// Turns a protocol message into a storable string and back.
pub trait MessageSerializer<M>: Send + Sync + fmt::Debug {
    /// Serializes a message.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Serialization`] if the message cannot be written.
    fn serialize(&self, message: &M) -> ArtifactResult<String>;

    /// Rebuilds a message.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Serialization`] if the data cannot be parsed.
    fn deserialize(&self, data: &str) -> ArtifactResult<M>;
}

/// JSON serialization via serde_json.
pub struct JsonMessageSerializer<M>(PhantomData<fn() -> M>);

impl<M> JsonMessageSerializer<M> {
    /// Creates the serializer.
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<M> Default for JsonMessageSerializer<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for JsonMessageSerializer<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonMessageSerializer")
    }
}

impl<M> MessageSerializer<M> for JsonMessageSerializer<M>
where
    M: Serialize + DeserializeOwned,
{
    fn serialize(&self, message: &M) -> ArtifactResult<String> {
        Ok(serde_json::to_string(message)?)
    }

    fn deserialize(&self, data: &str) -> ArtifactResult<M> {
        Ok(serde_json::from_str(data)?)
    }
}

/// XML serialization via quick-xml's serde support.
pub struct XmlMessageSerializer<M>(PhantomData<fn() -> M>);

impl<M> XmlMessageSerializer<M> {
    /// Creates the serializer.
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<M> Default for XmlMessageSerializer<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for XmlMessageSerializer<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("XmlMessageSerializer")
    }
}

impl<M> MessageSerializer<M> for XmlMessageSerializer<M>
where
    M: Serialize + DeserializeOwned,
{
    fn serialize(&self, message: &M) -> ArtifactResult<String> {
        quick_xml::se::to_string(message).map_err(|e| ArtifactError::Serialization(e.to_string()))
    }

    fn deserialize(&self, data: &str) -> ArtifactResult<M> {
        quick_xml::de::from_str(data).map_err(|e| ArtifactError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct LogoutRequest {
        #[serde(rename = "@ID")]
        id: String,
        #[serde(rename = "Issuer")]
        issuer: String,
    }

    fn request() -> LogoutRequest {
        LogoutRequest {
            id: "_8e8dc5f69a98cc4c1ff3427e5ce34606fd672f91e6".to_string(),
            issuer: "https://idp.example.org".to_string(),
        }
    }

    #[test]
    fn xml_serializer_writes_elements_and_attributes() {
        let serializer = XmlMessageSerializer::<LogoutRequest>::new();
        let xml = serializer.serialize(&request()).unwrap();

        assert!(xml.starts_with("<LogoutRequest"), "{xml}");
        assert!(xml.contains(r#"ID="_8e8dc5f69a98cc4c1ff3427e5ce34606fd672f91e6""#));
        assert!(xml.contains("<Issuer>https://idp.example.org</Issuer>"));
        assert_eq!(serializer.deserialize(&xml).unwrap(), request());
    }

    #[test]
    fn malformed_input_is_a_serialization_error() {
        let json = JsonMessageSerializer::<LogoutRequest>::new();
        assert!(matches!(json.deserialize("{"), Err(ArtifactError::Serialization(_))));

        let xml = XmlMessageSerializer::<LogoutRequest>::new();
        assert!(matches!(xml.deserialize("<Other/>"), Err(ArtifactError::Serialization(_))));
    }
}
