use std::sync::Arc;

use kc_core::Error;
use tracing::trace;

use super::{TokenKind, TrustEngine, TrustToken};
use crate::criteria::CriteriaSet;
use crate::error::SecurityResult;

/// Logical OR over member engines of one token kind.
///
/// Members are tried in order and the first `true` wins. An error from a
/// member propagates immediately. With no members nothing is trusted.
#[derive(Debug, Clone)]
pub struct ChainingTrustEngine {
    kind: TokenKind,
    engines: Vec<Arc<dyn TrustEngine>>,
}

impl ChainingTrustEngine {
    /// Creates a chaining engine for `kind`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a member evaluates a different kind.
    pub fn new(kind: TokenKind, engines: Vec<Arc<dyn TrustEngine>>) -> SecurityResult<Self> {
        if let Some(mismatch) = engines.iter().find(|e| e.token_kind() != kind) {
            return Err(Error::config(format!(
                "chaining {kind} trust engine cannot hold a {} engine",
                mismatch.token_kind()
            ))
            .into());
        }
        Ok(Self { kind, engines })
    }

    /// Returns the member engines.
    #[must_use]
    pub fn engines(&self) -> &[Arc<dyn TrustEngine>] {
        &self.engines
    }
}

impl TrustEngine for ChainingTrustEngine {
    fn token_kind(&self) -> TokenKind {
        self.kind
    }

    fn validate(&self, token: &TrustToken<'_>, criteria: &CriteriaSet) -> SecurityResult<bool> {
        for (index, engine) in self.engines.iter().enumerate() {
            if engine.validate(token, criteria)? {
                trace!(index, "Chained trust engine accepted token");
                return Ok(true);
            }
        }
        Ok(false)
    }
}
