use std::sync::Arc;

use chrono::Duration;
use kc_core::{Clock, SecurityConfig};
use tracing::debug;

use crate::error::{SecurityError, SecurityResult};
use crate::policy::{SecurityPolicyContext, SecurityPolicyRule};

/// Rejects messages issued in the future or too long ago.
///
/// A message is accepted when
/// `issue_instant <= now + skew` and `issue_instant + skew + lifetime >= now`.
#[derive(Debug, Clone)]
pub struct MessageLifetimeRule {
    clock: Arc<dyn Clock>,
    clock_skew: Duration,
    message_lifetime: Duration,
    required: bool,
}

impl MessageLifetimeRule {
    const NAME: &'static str = "message-lifetime";

    /// Default tolerated clock skew.
    pub const DEFAULT_CLOCK_SKEW: Duration = Duration::minutes(3);

    /// Default message lifetime.
    pub const DEFAULT_MESSAGE_LIFETIME: Duration = Duration::minutes(3);

    /// Creates a rule with default skew and lifetime that requires an issue instant.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            clock_skew: Self::DEFAULT_CLOCK_SKEW,
            message_lifetime: Self::DEFAULT_MESSAGE_LIFETIME,
            required: true,
        }
    }

    /// Creates a rule from configuration.
    #[must_use]
    pub fn from_config(clock: Arc<dyn Clock>, config: &SecurityConfig) -> Self {
        Self::new(clock)
            .with_clock_skew(config.clock_skew())
            .with_message_lifetime(config.message_lifetime())
            .required(config.require_issue_instant)
    }

    /// Sets the tolerated clock skew.
    #[must_use]
    pub fn with_clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }

    /// Sets the message lifetime.
    #[must_use]
    pub fn with_message_lifetime(mut self, lifetime: Duration) -> Self {
        self.message_lifetime = lifetime;
        self
    }

    /// Sets whether a missing issue instant is a failure.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

impl SecurityPolicyRule for MessageLifetimeRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn evaluate(&self, context: &mut SecurityPolicyContext<'_>) -> SecurityResult<()> {
        let Some(issue_instant) = context.issue_instant() else {
            if self.required {
                return Err(SecurityError::rejected(Self::NAME, "message has no issue instant"));
            }
            debug!("No issue instant; lifetime check skipped");
            return Ok(());
        };

        let now = self.clock.now();
        let Some(latest_valid) = now.checked_add_signed(self.clock_skew) else {
            return Err(SecurityError::rejected(
                Self::NAME,
                "clock skew window exceeds the representable time range",
            ));
        };

        if issue_instant > latest_valid {
            return Err(SecurityError::rejected(
                Self::NAME,
                format!("message was issued in the future: {issue_instant} is after {latest_valid}"),
            ));
        }

        // An expiration past the representable range never lapses.
        let expiration = issue_instant
            .checked_add_signed(self.clock_skew)
            .and_then(|t| t.checked_add_signed(self.message_lifetime));
        if let Some(expiration) = expiration.filter(|expiration| *expiration < now) {
            return Err(SecurityError::rejected(
                Self::NAME,
                format!("message expired at {expiration}, now is {now}"),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use kc_core::FixedClock;

    use super::*;
    use crate::policy::{MessageFacts, TransportFacts};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn rule() -> MessageLifetimeRule {
        MessageLifetimeRule::new(Arc::new(FixedClock::new(now())))
    }

    fn evaluate(rule: &MessageLifetimeRule, instant: Option<DateTime<Utc>>) -> SecurityResult<()> {
        let transport = TransportFacts::new();
        let message = MessageFacts::new();
        let mut context = SecurityPolicyContext::new(&transport, &message);
        context.set_issue_instant(instant);
        rule.evaluate(&mut context)
    }

    #[test]
    fn current_message_is_accepted() {
        assert!(evaluate(&rule(), Some(now())).is_ok());
    }

    #[test]
    fn future_boundary_is_inclusive() {
        let skew = MessageLifetimeRule::DEFAULT_CLOCK_SKEW;
        assert!(evaluate(&rule(), Some(now() + skew)).is_ok());

        let err = evaluate(&rule(), Some(now() + skew + Duration::milliseconds(1))).unwrap_err();
        assert!(err.to_string().contains("future"));
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let window = MessageLifetimeRule::DEFAULT_CLOCK_SKEW + MessageLifetimeRule::DEFAULT_MESSAGE_LIFETIME;
        assert!(evaluate(&rule(), Some(now() - window)).is_ok());

        let err = evaluate(&rule(), Some(now() - window - Duration::milliseconds(1))).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn missing_instant_depends_on_required_flag() {
        assert!(evaluate(&rule(), None).unwrap_err().is_rejection());
        assert!(evaluate(&rule().required(false), None).is_ok());
    }

    #[test]
    fn configured_windows_are_used() {
        let rule = rule()
            .with_clock_skew(Duration::seconds(10))
            .with_message_lifetime(Duration::seconds(20));

        assert!(evaluate(&rule, Some(now() - Duration::seconds(30))).is_ok());
        assert!(evaluate(&rule, Some(now() - Duration::seconds(31))).is_err());
        assert!(evaluate(&rule, Some(now() + Duration::seconds(11))).is_err());
    }

    #[test]
    fn from_config_uses_configured_values() {
        let config = SecurityConfig {
            clock_skew_secs: 0,
            message_lifetime_secs: 60,
            require_issue_instant: false,
            ..SecurityConfig::default()
        };
        let rule = MessageLifetimeRule::from_config(Arc::new(FixedClock::new(now())), &config);

        assert!(evaluate(&rule, None).is_ok());
        assert!(evaluate(&rule, Some(now() + Duration::seconds(1))).is_err());
        assert!(evaluate(&rule, Some(now() - Duration::seconds(60))).is_ok());
    }

    #[test]
    fn far_future_instant_is_rejected() {
        let instant = DateTime::<Utc>::MAX_UTC - Duration::seconds(1);
        let err = evaluate(&rule(), Some(instant)).unwrap_err();
        assert!(matches!(err, SecurityError::PolicyRejected { rule: "message-lifetime", .. }));
        assert!(err.to_string().contains("future"));
    }

    #[test]
    fn oversized_windows_do_not_overflow() {
        let clock = Arc::new(FixedClock::new(DateTime::<Utc>::MAX_UTC - Duration::seconds(1)));
        let rule = MessageLifetimeRule::new(clock)
            .with_clock_skew(Duration::seconds(0))
            .with_message_lifetime(Duration::days(365));

        let instant = DateTime::<Utc>::MAX_UTC - Duration::seconds(2);
        assert!(evaluate(&rule, Some(instant)).is_ok());

        let rule = rule.with_clock_skew(Duration::days(1));
        assert!(evaluate(&rule, Some(instant)).unwrap_err().is_rejection());
    }
}
