//! Security policy evaluation.
//!
//! A [`SecurityPolicy`] runs its rules strictly in the configured order
//! against a fresh [`SecurityPolicyContext`]. The first failing rule stops
//! the pipeline and its error is returned; later rules never run.

mod context;
mod message;
pub mod rules;
mod transport;

use std::fmt;
use std::sync::Arc;

use kc_core::{Error, EventListener, EventType, SecurityEvent, TracingEventListener};
use tracing::{debug, trace, warn};

use crate::error::SecurityResult;

pub use context::{ContextSlot, SecurityPolicyContext};
pub use message::{MessageFacts, MessageSignature, ProtocolMessage};
pub use transport::TransportFacts;

/// One independently testable check on an inbound message.
///
/// Rules are shared across request threads and must not keep per-message
/// state. A rule that does not apply returns `Ok(())` without touching the
/// context.
pub trait SecurityPolicyRule: Send + Sync + fmt::Debug {
    /// Returns a short name used in logs and rejections.
    fn name(&self) -> &'static str;

    /// Evaluates the rule.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SecurityError::PolicyRejected`] if the message fails
    /// the rule, or an infrastructure error if it cannot be evaluated.
    fn evaluate(&self, context: &mut SecurityPolicyContext<'_>) -> SecurityResult<()>;
}

/// Seeds a fresh context with protocol-specific facts before any rule runs.
pub trait ContextInitializer: Send + Sync {
    /// Populates the context.
    fn initialize(&self, context: &mut SecurityPolicyContext<'_>);
}

/// An ordered, fail-fast pipeline of rules.
#[derive(Clone)]
pub struct SecurityPolicy {
    name: String,
    rules: Vec<Arc<dyn SecurityPolicyRule>>,
    initializer: Option<Arc<dyn ContextInitializer>>,
    listener: Arc<dyn EventListener>,
}

impl SecurityPolicy {
    /// Creates a policy from rules.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `rules` is empty.
    pub fn new(name: impl Into<String>, rules: Vec<Arc<dyn SecurityPolicyRule>>) -> SecurityResult<Self> {
        let mut builder = Self::builder(name);
        builder.rules = rules;
        builder.build()
    }

    /// Creates a policy builder.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SecurityPolicyBuilder {
        SecurityPolicyBuilder {
            name: name.into(),
            rules: Vec::new(),
            initializer: None,
            listener: None,
        }
    }

    /// Returns the policy name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Arc<dyn SecurityPolicyRule>] {
        &self.rules
    }

    /// Evaluates every rule against `message` received over `transport`.
    ///
    /// Returns the populated context on success; its
    /// [`issuer`](SecurityPolicyContext::issuer) is the resolved issuer.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing rule.
    pub fn evaluate<'a>(
        &self,
        transport: &'a TransportFacts,
        message: &'a dyn ProtocolMessage,
    ) -> SecurityResult<SecurityPolicyContext<'a>> {
        let mut context = SecurityPolicyContext::new(transport, message);
        if let Some(initializer) = &self.initializer {
            initializer.initialize(&mut context);
        }

        for rule in &self.rules {
            if let Err(e) = rule.evaluate(&mut context) {
                warn!(policy = %self.name, rule = rule.name(), error = %e, "Security policy rule failed");
                self.listener.on_event(
                    &SecurityEvent::builder(EventType::PolicyRejected)
                        .failure(e.to_string())
                        .issuer(context.issuer())
                        .message_id(context.message_id())
                        .detail("policy", &self.name)
                        .detail("rule", rule.name())
                        .build(),
                );
                return Err(e);
            }
            trace!(policy = %self.name, rule = rule.name(), "Security policy rule passed");
        }

        debug!(
            policy = %self.name,
            issuer = context.issuer(),
            authenticated = ?context.issuer_authenticated(),
            "Security policy accepted message"
        );
        self.listener.on_event(
            &SecurityEvent::builder(EventType::PolicyAccepted)
                .success()
                .issuer(context.issuer())
                .message_id(context.message_id())
                .detail("policy", &self.name)
                .build(),
        );

        Ok(context)
    }
}

impl fmt::Debug for SecurityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityPolicy")
            .field("name", &self.name)
            .field("rules", &self.rules)
            .field("initializer", &self.initializer.is_some())
            .field("listener", &self.listener)
            .finish()
    }
}

/// Builder for [`SecurityPolicy`].
pub struct SecurityPolicyBuilder {
    name: String,
    rules: Vec<Arc<dyn SecurityPolicyRule>>,
    initializer: Option<Arc<dyn ContextInitializer>>,
    listener: Option<Arc<dyn EventListener>>,
}

impl SecurityPolicyBuilder {
    /// Appends a rule.
    #[must_use]
    pub fn rule(self, rule: impl SecurityPolicyRule + 'static) -> Self {
        self.shared_rule(Arc::new(rule))
    }

    /// Appends a rule shared with other policies.
    #[must_use]
    pub fn shared_rule(mut self, rule: Arc<dyn SecurityPolicyRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Sets the context initializer.
    #[must_use]
    pub fn initializer(mut self, initializer: impl ContextInitializer + 'static) -> Self {
        self.initializer = Some(Arc::new(initializer));
        self
    }

    /// Sets the event listener. Defaults to [`TracingEventListener`].
    #[must_use]
    pub fn listener(mut self, listener: Arc<dyn EventListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Builds the policy.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no rules were added.
    pub fn build(self) -> SecurityResult<SecurityPolicy> {
        if self.rules.is_empty() {
            return Err(Error::config(format!("security policy '{}' has no rules", self.name)).into());
        }

        Ok(SecurityPolicy {
            name: self.name,
            rules: self.rules,
            initializer: self.initializer,
            listener: self.listener.unwrap_or_else(|| Arc::new(TracingEventListener)),
        })
    }
}

impl fmt::Debug for SecurityPolicyBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityPolicyBuilder")
            .field("name", &self.name)
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}

/// Selects the policies that apply to an inbound request.
pub trait SecurityPolicyResolver: Send + Sync + fmt::Debug {
    /// Returns every applicable policy.
    ///
    /// # Errors
    ///
    /// Returns an error if policies cannot be looked up.
    fn resolve(&self, transport: &TransportFacts) -> SecurityResult<Vec<Arc<SecurityPolicy>>>;

    /// Returns the first applicable policy.
    ///
    /// # Errors
    ///
    /// Returns an error if policies cannot be looked up.
    fn resolve_single(&self, transport: &TransportFacts) -> SecurityResult<Option<Arc<SecurityPolicy>>> {
        Ok(self.resolve(transport)?.into_iter().next())
    }
}

/// Returns the same configured policies for every request.
#[derive(Debug, Clone)]
pub struct StaticSecurityPolicyResolver {
    policies: Vec<Arc<SecurityPolicy>>,
}

impl StaticSecurityPolicyResolver {
    /// Creates a resolver.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `policies` is empty.
    pub fn new(policies: Vec<Arc<SecurityPolicy>>) -> SecurityResult<Self> {
        if policies.is_empty() {
            return Err(Error::config("security policy resolver has no policies").into());
        }
        Ok(Self { policies })
    }
}

impl SecurityPolicyResolver for StaticSecurityPolicyResolver {
    fn resolve(&self, _transport: &TransportFacts) -> SecurityResult<Vec<Arc<SecurityPolicy>>> {
        Ok(self.policies.clone())
    }
}
