//! Per-evaluation scratch record.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use super::message::ProtocolMessage;
use super::transport::TransportFacts;

/// Named protocol facts carried alongside the core context fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContextSlot {
    /// Metadata role expected of the peer (e.g. `SPSSODescriptor`).
    PeerEntityRole,
    /// Protocol support enumeration of the exchange.
    Protocol,
    /// Binding the message arrived over.
    InboundBinding,
    /// Relay state received with the message.
    RelayState,
    /// Identifier of the metadata source consulted for the peer.
    MetadataSource,
}

/// Facts learned about one inbound message while a policy evaluates it.
///
/// Created fresh by [`super::SecurityPolicy::evaluate`] and never shared
/// between evaluations.
pub struct SecurityPolicyContext<'a> {
    transport: &'a TransportFacts,
    message: &'a dyn ProtocolMessage,
    issuer: Option<String>,
    issuer_authenticated: Option<bool>,
    message_id: Option<String>,
    issue_instant: Option<DateTime<Utc>>,
    slots: BTreeMap<ContextSlot, String>,
}

impl<'a> SecurityPolicyContext<'a> {
    /// Creates an empty context for one message.
    #[must_use]
    pub fn new(transport: &'a TransportFacts, message: &'a dyn ProtocolMessage) -> Self {
        Self {
            transport,
            message,
            issuer: None,
            issuer_authenticated: None,
            message_id: None,
            issue_instant: None,
            slots: BTreeMap::new(),
        }
    }

    /// Returns the inbound transport facts.
    #[must_use]
    pub const fn transport(&self) -> &'a TransportFacts {
        self.transport
    }

    /// Returns the message under evaluation.
    #[must_use]
    pub const fn message(&self) -> &'a dyn ProtocolMessage {
        self.message
    }

    /// Returns the resolved issuer.
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// Sets the issuer. Whitespace is trimmed and an empty value clears it.
    pub fn set_issuer(&mut self, issuer: Option<&str>) {
        self.issuer = issuer
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }

    /// Returns whether the issuer was authenticated: unknown, yes or no.
    #[must_use]
    pub const fn issuer_authenticated(&self) -> Option<bool> {
        self.issuer_authenticated
    }

    /// Returns true only if the issuer is known to be authenticated.
    #[must_use]
    pub fn is_issuer_authenticated(&self) -> bool {
        self.issuer_authenticated == Some(true)
    }

    /// Records the outcome of issuer authentication.
    pub fn set_issuer_authenticated(&mut self, authenticated: bool) {
        self.issuer_authenticated = Some(authenticated);
    }

    /// Returns the message ID.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    /// Sets the message ID.
    pub fn set_message_id(&mut self, id: Option<&str>) {
        self.message_id = id.map(str::to_string);
    }

    /// Returns the issue instant.
    #[must_use]
    pub const fn issue_instant(&self) -> Option<DateTime<Utc>> {
        self.issue_instant
    }

    /// Sets the issue instant.
    pub fn set_issue_instant(&mut self, instant: Option<DateTime<Utc>>) {
        self.issue_instant = instant;
    }

    /// Returns the value held in a slot.
    #[must_use]
    pub fn slot(&self, slot: ContextSlot) -> Option<&str> {
        self.slots.get(&slot).map(String::as_str)
    }

    /// Stores a value in a slot, returning the previous value.
    pub fn set_slot(&mut self, slot: ContextSlot, value: impl Into<String>) -> Option<String> {
        self.slots.insert(slot, value.into())
    }
}

impl fmt::Debug for SecurityPolicyContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityPolicyContext")
            .field("issuer", &self.issuer)
            .field("issuer_authenticated", &self.issuer_authenticated)
            .field("message_id", &self.message_id)
            .field("issue_instant", &self.issue_instant)
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::MessageFacts;

    #[test]
    fn issuer_is_trimmed_and_empty_is_absent() {
        let transport = TransportFacts::new();
        let message = MessageFacts::new();
        let mut context = SecurityPolicyContext::new(&transport, &message);

        context.set_issuer(Some("  https://idp.example.org \n"));
        assert_eq!(context.issuer(), Some("https://idp.example.org"));

        context.set_issuer(Some("   "));
        assert_eq!(context.issuer(), None);
    }

    #[test]
    fn authentication_is_tri_state() {
        let transport = TransportFacts::new();
        let message = MessageFacts::new();
        let mut context = SecurityPolicyContext::new(&transport, &message);

        assert_eq!(context.issuer_authenticated(), None);
        assert!(!context.is_issuer_authenticated());

        context.set_issuer_authenticated(false);
        assert_eq!(context.issuer_authenticated(), Some(false));

        context.set_issuer_authenticated(true);
        assert!(context.is_issuer_authenticated());
    }

    #[test]
    fn slots_hold_protocol_facts() {
        let transport = TransportFacts::new();
        let message = MessageFacts::new();
        let mut context = SecurityPolicyContext::new(&transport, &message);

        assert_eq!(context.set_slot(ContextSlot::PeerEntityRole, "SPSSODescriptor"), None);
        assert_eq!(
            context.set_slot(ContextSlot::PeerEntityRole, "IDPSSODescriptor").as_deref(),
            Some("SPSSODescriptor")
        );
        assert_eq!(context.slot(ContextSlot::PeerEntityRole), Some("IDPSSODescriptor"));
        assert_eq!(context.slot(ContextSlot::RelayState), None);
    }
}
