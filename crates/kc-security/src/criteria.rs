//! Credential selection criteria.

use std::collections::BTreeMap;

use crate::credential::{KeyAlgorithm, UsageType};

/// The kind of a [`Criterion`]. A [`CriteriaSet`] holds at most one of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CriterionKind {
    /// Owner of the wanted credential.
    EntityId,
    /// Entity on the other end of the exchange.
    PeerEntityId,
    /// Protocol support enumeration (e.g. the SAML 2.0 protocol URN).
    Protocol,
    /// Metadata role of the owner (e.g. `SPSSODescriptor`).
    EntityRole,
    /// Intended key usage.
    Usage,
    /// Key name carried in `KeyInfo`.
    KeyName,
    /// Public key algorithm family.
    KeyAlgorithm,
}

/// A single selection criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Owner of the wanted credential.
    EntityId(String),
    /// Entity on the other end of the exchange.
    PeerEntityId(String),
    /// Protocol support enumeration.
    Protocol(String),
    /// Metadata role of the owner.
    EntityRole(String),
    /// Intended key usage.
    Usage(UsageType),
    /// Key name.
    KeyName(String),
    /// Public key algorithm family.
    KeyAlgorithm(KeyAlgorithm),
}

impl Criterion {
    /// Returns the kind of this criterion.
    #[must_use]
    pub const fn kind(&self) -> CriterionKind {
        match self {
            Self::EntityId(_) => CriterionKind::EntityId,
            Self::PeerEntityId(_) => CriterionKind::PeerEntityId,
            Self::Protocol(_) => CriterionKind::Protocol,
            Self::EntityRole(_) => CriterionKind::EntityRole,
            Self::Usage(_) => CriterionKind::Usage,
            Self::KeyName(_) => CriterionKind::KeyName,
            Self::KeyAlgorithm(_) => CriterionKind::KeyAlgorithm,
        }
    }
}

/// An unordered bag of criteria, one per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaSet {
    criteria: BTreeMap<CriterionKind, Criterion>,
}

impl CriteriaSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a criterion, replacing any previous one of the same kind.
    #[must_use]
    pub fn with(mut self, criterion: Criterion) -> Self {
        self.add(criterion);
        self
    }

    /// Adds a criterion and returns the one it replaced.
    pub fn add(&mut self, criterion: Criterion) -> Option<Criterion> {
        self.criteria.insert(criterion.kind(), criterion)
    }

    /// Returns the criterion of the given kind.
    #[must_use]
    pub fn get(&self, kind: CriterionKind) -> Option<&Criterion> {
        self.criteria.get(&kind)
    }

    /// Returns whether a criterion of the given kind is present.
    #[must_use]
    pub fn contains(&self, kind: CriterionKind) -> bool {
        self.criteria.contains_key(&kind)
    }

    /// Returns the number of criteria.
    #[must_use]
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Iterates the criteria in kind order.
    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.values()
    }

    /// Returns the entity ID criterion value.
    #[must_use]
    pub fn entity_id(&self) -> Option<&str> {
        match self.get(CriterionKind::EntityId) {
            Some(Criterion::EntityId(id)) => Some(id),
            _ => None,
        }
    }

    /// Returns the peer entity ID criterion value.
    #[must_use]
    pub fn peer_entity_id(&self) -> Option<&str> {
        match self.get(CriterionKind::PeerEntityId) {
            Some(Criterion::PeerEntityId(id)) => Some(id),
            _ => None,
        }
    }

    /// Returns the protocol criterion value.
    #[must_use]
    pub fn protocol(&self) -> Option<&str> {
        match self.get(CriterionKind::Protocol) {
            Some(Criterion::Protocol(p)) => Some(p),
            _ => None,
        }
    }

    /// Returns the entity role criterion value.
    #[must_use]
    pub fn entity_role(&self) -> Option<&str> {
        match self.get(CriterionKind::EntityRole) {
            Some(Criterion::EntityRole(r)) => Some(r),
            _ => None,
        }
    }

    /// Returns the usage criterion value.
    #[must_use]
    pub fn usage(&self) -> Option<UsageType> {
        match self.get(CriterionKind::Usage) {
            Some(Criterion::Usage(u)) => Some(*u),
            _ => None,
        }
    }

    /// Returns the key name criterion value.
    #[must_use]
    pub fn key_name(&self) -> Option<&str> {
        match self.get(CriterionKind::KeyName) {
            Some(Criterion::KeyName(n)) => Some(n),
            _ => None,
        }
    }

    /// Returns the key algorithm criterion value.
    #[must_use]
    pub fn key_algorithm(&self) -> Option<KeyAlgorithm> {
        match self.get(CriterionKind::KeyAlgorithm) {
            Some(Criterion::KeyAlgorithm(a)) => Some(*a),
            _ => None,
        }
    }
}

impl FromIterator<Criterion> for CriteriaSet {
    fn from_iter<I: IntoIterator<Item = Criterion>>(iter: I) -> Self {
        let mut set = Self::new();
        for criterion in iter {
            set.add(criterion);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_criterion_per_kind() {
        let mut set = CriteriaSet::new().with(Criterion::EntityId("a".to_string()));
        let previous = set.add(Criterion::EntityId("b".to_string()));

        assert_eq!(previous, Some(Criterion::EntityId("a".to_string())));
        assert_eq!(set.len(), 1);
        assert_eq!(set.entity_id(), Some("b"));
    }

    #[test]
    fn typed_accessors() {
        let set: CriteriaSet = [
            Criterion::EntityId("https://idp.example.org".to_string()),
            Criterion::Usage(UsageType::Signing),
            Criterion::KeyAlgorithm(KeyAlgorithm::Rsa),
            Criterion::EntityRole("IDPSSODescriptor".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.entity_id(), Some("https://idp.example.org"));
        assert_eq!(set.usage(), Some(UsageType::Signing));
        assert_eq!(set.key_algorithm(), Some(KeyAlgorithm::Rsa));
        assert_eq!(set.entity_role(), Some("IDPSSODescriptor"));
        assert_eq!(set.protocol(), None);
        assert!(!set.contains(CriterionKind::KeyName));
    }
}
