//! SAML 2.0 constants and URIs.

/// SAML 2.0 protocol support enumeration (also the protocol namespace).
pub const SAML20P_NS: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// Metadata role names used as peer entity roles.
pub mod roles {
    /// Identity provider SSO role.
    pub const IDP_SSO_DESCRIPTOR: &str = "IDPSSODescriptor";
    /// Service provider SSO role.
    pub const SP_SSO_DESCRIPTOR: &str = "SPSSODescriptor";
    /// Attribute authority role.
    pub const ATTRIBUTE_AUTHORITY_DESCRIPTOR: &str = "AttributeAuthorityDescriptor";
}

/// SAML binding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamlBinding {
    /// HTTP POST binding.
    HttpPost,
    /// HTTP POST binding with a form-level signature.
    HttpPostSimpleSign,
    /// HTTP Redirect binding.
    HttpRedirect,
    /// HTTP Artifact binding.
    HttpArtifact,
    /// SOAP binding.
    Soap,
}

impl SamlBinding {
    /// Returns the URI for this binding.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::HttpPost => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST",
            Self::HttpPostSimpleSign => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST-SimpleSign",
            Self::HttpRedirect => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect",
            Self::HttpArtifact => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact",
            Self::Soap => "urn:oasis:names:tc:SAML:2.0:bindings:SOAP",
        }
    }

    /// Parses a binding from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" => Some(Self::HttpPost),
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST-SimpleSign" => {
                Some(Self::HttpPostSimpleSign)
            }
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect" => Some(Self::HttpRedirect),
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact" => Some(Self::HttpArtifact),
            "urn:oasis:names:tc:SAML:2.0:bindings:SOAP" => Some(Self::Soap),
            _ => None,
        }
    }

    /// Returns the HTTP method messages arrive with over this binding.
    #[must_use]
    pub const fn http_method(&self) -> &'static str {
        match self {
            Self::HttpRedirect | Self::HttpArtifact => "GET",
            Self::HttpPost | Self::HttpPostSimpleSign | Self::Soap => "POST",
        }
    }
}
