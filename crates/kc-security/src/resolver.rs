//! Credential resolvers.
//!
//! A resolver turns a [`CriteriaSet`] into a lazy sequence of candidate
//! trusted credentials. Items are fallible so a resolver backed by remote
//! metadata can report an I/O failure part way through.

use std::fmt;
use std::iter;
use std::sync::Arc;

use kc_core::Error;
use tracing::debug;

use crate::credential::Credential;
use crate::criteria::CriteriaSet;
use crate::error::SecurityResult;

/// Lazy sequence of resolved credentials.
pub type Credentials<'a> = Box<dyn Iterator<Item = SecurityResult<Credential>> + 'a>;

/// Produces candidate trusted credentials for a set of criteria.
pub trait CredentialResolver: Send + Sync + fmt::Debug {
    /// Resolves all credentials matching the criteria.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential source cannot be queried.
    fn resolve<'a>(&'a self, criteria: &'a CriteriaSet) -> SecurityResult<Credentials<'a>>;

    /// Resolves the first credential matching the criteria.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential source cannot be queried.
    fn resolve_single(&self, criteria: &CriteriaSet) -> SecurityResult<Option<Credential>> {
        self.resolve(criteria)?.next().transpose()
    }
}

/// Resolver over a fixed, in-memory collection of credentials.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialResolver {
    credentials: Vec<Credential>,
}

impl StaticCredentialResolver {
    /// Creates a resolver over the given credentials.
    #[must_use]
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self { credentials }
    }

    /// Returns the number of credentials held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Returns whether the resolver holds no credentials.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    fn matches(credential: &Credential, criteria: &CriteriaSet) -> bool {
        // A credential without an owner never satisfies an entity ID criterion.
        if let Some(entity_id) = criteria.entity_id() {
            if credential.entity_id() != Some(entity_id) {
                return false;
            }
        }

        if let Some(usage) = criteria.usage() {
            if !credential.usage().permits(usage) {
                return false;
            }
        }

        if let Some(name) = criteria.key_name() {
            if !credential.key_names().contains(name) {
                return false;
            }
        }

        if let Some(algorithm) = criteria.key_algorithm() {
            if credential.public_key().map(|k| k.algorithm()) != Some(algorithm) {
                return false;
            }
        }

        true
    }
}

impl CredentialResolver for StaticCredentialResolver {
    fn resolve<'a>(&'a self, criteria: &'a CriteriaSet) -> SecurityResult<Credentials<'a>> {
        debug!(
            entity_id = criteria.entity_id(),
            candidates = self.credentials.len(),
            "Resolving credentials from static collection"
        );

        Ok(Box::new(
            self.credentials
                .iter()
                .filter(move |c| Self::matches(c, criteria))
                .cloned()
                .map(Ok),
        ))
    }
}

/// Resolver that consults member resolvers in order.
///
/// Results are concatenated lazily; a later member is not queried until the
/// earlier ones are exhausted.
#[derive(Debug, Clone)]
pub struct ChainingCredentialResolver {
    resolvers: Vec<Arc<dyn CredentialResolver>>,
}

impl ChainingCredentialResolver {
    /// Creates a chaining resolver.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no member resolvers are given.
    pub fn new(resolvers: Vec<Arc<dyn CredentialResolver>>) -> SecurityResult<Self> {
        if resolvers.is_empty() {
            return Err(Error::config("chaining credential resolver requires at least one member").into());
        }
        Ok(Self { resolvers })
    }

    /// Returns the member resolvers.
    #[must_use]
    pub fn resolvers(&self) -> &[Arc<dyn CredentialResolver>] {
        &self.resolvers
    }
}

impl CredentialResolver for ChainingCredentialResolver {
    fn resolve<'a>(&'a self, criteria: &'a CriteriaSet) -> SecurityResult<Credentials<'a>> {
        let chained = self
            .resolvers
            .iter()
            .flat_map(move |resolver| -> Credentials<'a> {
                match resolver.resolve(criteria) {
                    Ok(credentials) => credentials,
                    Err(e) => Box::new(iter::once(Err(e))),
                }
            });
        Ok(Box::new(chained))
    }
}
