use tracing::debug;

use crate::error::{SecurityError, SecurityResult};
use crate::policy::{SecurityPolicyContext, SecurityPolicyRule};

/// Copies the issuer, message ID and issue instant from the message into
/// the context.
///
/// Values already present in the context are only replaced when the message
/// carries its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageInfoRule;

impl SecurityPolicyRule for MessageInfoRule {
    fn name(&self) -> &'static str {
        "message-info"
    }

    fn evaluate(&self, context: &mut SecurityPolicyContext<'_>) -> SecurityResult<()> {
        let message = context.message();

        if let Some(issuer) = message.issuer() {
            context.set_issuer(Some(issuer));
        }
        if let Some(id) = message.message_id() {
            context.set_message_id(Some(id));
        }
        if let Some(instant) = message.issue_instant() {
            context.set_issue_instant(Some(instant));
        }

        debug!(
            issuer = context.issuer(),
            message_id = context.message_id(),
            "Extracted message information"
        );
        Ok(())
    }
}

/// Rejects a message whose issuer could not be determined.
#[derive(Debug, Clone, Copy, Default)]
pub struct MandatoryIssuerRule;

impl SecurityPolicyRule for MandatoryIssuerRule {
    fn name(&self) -> &'static str {
        "mandatory-issuer"
    }

    fn evaluate(&self, context: &mut SecurityPolicyContext<'_>) -> SecurityResult<()> {
        if context.issuer().is_none() {
            return Err(SecurityError::rejected(self.name(), "message issuer was not determined"));
        }
        Ok(())
    }
}

/// Rejects a message whose issuer was not authenticated by an earlier rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct MandatoryAuthenticatedMessageRule;

impl SecurityPolicyRule for MandatoryAuthenticatedMessageRule {
    fn name(&self) -> &'static str {
        "mandatory-authenticated-message"
    }

    fn evaluate(&self, context: &mut SecurityPolicyContext<'_>) -> SecurityResult<()> {
        if !context.is_issuer_authenticated() {
            return Err(SecurityError::rejected(self.name(), "message issuer was not authenticated"));
        }
        Ok(())
    }
}
