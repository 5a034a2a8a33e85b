use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use kc_cache::ReplayCache;
use kc_core::{Clock, SecurityConfig};
use tracing::debug;

use crate::error::{SecurityError, SecurityResult};
use crate::policy::{SecurityPolicyContext, SecurityPolicyRule};

/// Rejects a message ID already seen from the same issuer.
#[derive(Debug, Clone)]
pub struct MessageReplayRule {
    cache: ReplayCache,
    clock: Arc<dyn Clock>,
    expiration: Duration,
    required: bool,
}

impl MessageReplayRule {
    const NAME: &'static str = "message-replay";

    /// Storage partition holding seen message IDs.
    pub const REPLAY_CONTEXT: &'static str = "_SAMLReplayCache";

    /// Default time a message ID is remembered.
    pub const DEFAULT_EXPIRATION: Duration = Duration::hours(8);

    /// Creates a rule that requires a message ID.
    #[must_use]
    pub fn new(cache: ReplayCache, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache,
            clock,
            expiration: Self::DEFAULT_EXPIRATION,
            required: true,
        }
    }

    /// Creates a rule from configuration.
    #[must_use]
    pub fn from_config(cache: ReplayCache, clock: Arc<dyn Clock>, config: &SecurityConfig) -> Self {
        Self::new(cache, clock)
            .with_expiration(config.replay_cache_expiration())
            .required(config.require_message_id)
    }

    /// Sets how long message IDs are remembered.
    #[must_use]
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = expiration;
        self
    }

    /// Sets whether a missing message ID is a failure.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

impl SecurityPolicyRule for MessageReplayRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate(&self, context: &mut SecurityPolicyContext<'_>) -> SecurityResult<()> {
        let Some(message_id) = context.message_id() else {
            if self.required {
                return Err(SecurityError::rejected(Self::NAME, "message has no ID"));
            }
            debug!("No message ID; replay check skipped");
            return Ok(());
        };

        let issuer = context.issuer().unwrap_or_default();
        // Length prefix keeps issuer and ID unambiguous when either holds '!'.
        let key = format!("{}!{issuer}!{message_id}", issuer.len());
        let now = self.clock.now();
        let expires = now
            .checked_add_signed(self.expiration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        if !self.cache.check(Self::REPLAY_CONTEXT, &key, expires)? {
            return Err(SecurityError::rejected(
                Self::NAME,
                format!("replay detected of message '{message_id}' from issuer '{issuer}'"),
            ));
        }

        Ok(())
    }
}
