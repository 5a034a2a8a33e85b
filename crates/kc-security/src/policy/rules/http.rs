use tracing::debug;

use crate::error::{SecurityError, SecurityResult};
use crate::policy::{SecurityPolicyContext, SecurityPolicyRule};

/// Checks transport properties. Every expectation is optional and an unset
/// one is never checked.
#[derive(Debug, Clone, Default)]
pub struct HttpRule {
    content_type: Option<String>,
    character_encoding: Option<String>,
    scheme: Option<String>,
    method: Option<String>,
    require_secure: bool,
}

impl HttpRule {
    const NAME: &'static str = "http";

    /// Creates a rule with no expectations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the content type to contain `content_type`.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Requires this exact character encoding.
    #[must_use]
    pub fn with_character_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.character_encoding = Some(encoding.into());
        self
    }

    /// Requires this exact scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Requires this exact method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Requires a secure transport.
    #[must_use]
    pub fn require_secure(mut self, required: bool) -> Self {
        self.require_secure = required;
        self
    }

    fn mismatch(what: &str, expected: &str, actual: Option<&str>) -> SecurityError {
        SecurityError::rejected(
            Self::NAME,
            format!("{what}: expected {expected} but was {}", actual.unwrap_or("(none)")),
        )
    }
}

impl SecurityPolicyRule for HttpRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate(&self, context: &mut SecurityPolicyContext<'_>) -> SecurityResult<()> {
        let transport = context.transport();

        if let Some(expected) = &self.content_type {
            let actual = transport.content_type();
            if !actual.is_some_and(|ct| ct.contains(expected.as_str())) {
                return Err(Self::mismatch("invalid content type", expected, actual));
            }
        }

        if let Some(expected) = &self.character_encoding {
            let actual = transport.character_encoding();
            if actual != Some(expected.as_str()) {
                return Err(Self::mismatch("invalid character encoding", expected, actual));
            }
        }

        if let Some(expected) = &self.scheme {
            let actual = transport.scheme();
            if actual != Some(expected.as_str()) {
                return Err(Self::mismatch("invalid scheme", expected, actual));
            }
        }

        if let Some(expected) = &self.method {
            let actual = transport.method();
            if actual != Some(expected.as_str()) {
                return Err(Self::mismatch("invalid request method", expected, actual));
            }
        }

        if self.require_secure && !transport.is_secure() {
            return Err(SecurityError::rejected(Self::NAME, "request was not received over a secure transport"));
        }

        debug!("Transport expectations met");
        Ok(())
    }
}
