//! Message replay detection.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::StorageResult;
use crate::provider::StorageService;

/// Remembers message identifiers until they expire.
///
/// Built on [`StorageService::create`], so two concurrent checks of the same
/// identifier cannot both succeed.
#[derive(Debug, Clone)]
pub struct ReplayCache {
    storage: Arc<dyn StorageService>,
}

impl ReplayCache {
    /// Creates a replay cache over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageService>) -> Self {
        Self { storage }
    }

    /// Records `key` in `context` until `expires`.
    ///
    /// Returns `true` the first time a key is seen, and `false` if it was
    /// already recorded and has not yet expired (a replay). Keys longer than
    /// the backend allows are stored as their SHA-1 hex digest.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    pub fn check(&self, context: &str, key: &str, expires: DateTime<Utc>) -> StorageResult<bool> {
        let stored_key = if key.len() > self.storage.capabilities().key_size {
            hex_digest(key)
        } else {
            key.to_string()
        };

        let fresh = self
            .storage
            .create(context, &stored_key, "", Some(expires.timestamp_millis()))?;
        if !fresh {
            tracing::warn!(context, key, "Replay detected");
        }
        Ok(fresh)
    }
}

fn hex_digest(value: &str) -> String {
    kc_crypto::sha1(value.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStorageService;
    use chrono::Duration;
    use kc_core::{Clock, FixedClock};

    #[test]
    fn second_sighting_is_a_replay() {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let cache = ReplayCache::new(Arc::new(InMemoryStorageService::new(clock.clone())));
        let expires = clock.now() + Duration::minutes(5);

        assert!(cache.check("issuer", "_msg1", expires).unwrap());
        assert!(!cache.check("issuer", "_msg1", expires).unwrap());
        assert!(cache.check("issuer", "_msg2", expires).unwrap());
        assert!(cache.check("other-issuer", "_msg1", expires).unwrap());
    }

    #[test]
    fn oversized_keys_are_hashed() {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let storage = Arc::new(InMemoryStorageService::new(clock.clone()));
        let cache = ReplayCache::new(storage.clone());
        let expires = clock.now() + Duration::minutes(5);
        let key = format!("https://idp.example.org!{}", "x".repeat(300));

        assert!(cache.check("issuer", &key, expires).unwrap());
        assert!(!cache.check("issuer", &key, expires).unwrap());
        assert!(storage.read("issuer", &hex_digest(&key)).unwrap().is_some());
    }

    #[test]
    fn expired_entry_is_not_a_replay() {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let cache = ReplayCache::new(Arc::new(InMemoryStorageService::new(clock.clone())));

        assert!(cache
            .check("issuer", "_msg", clock.now() + Duration::seconds(1))
            .unwrap());
        clock.advance(Duration::seconds(2));
        assert!(cache
            .check("issuer", "_msg", clock.now() + Duration::seconds(1))
            .unwrap());
    }
}
