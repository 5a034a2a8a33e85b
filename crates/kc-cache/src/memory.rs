//! In-memory storage service.

use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Weak};
use std::thread::JoinHandle;
use std::time::Duration;

use dashmap::DashMap;
use kc_core::{Clock, SystemClock};

use crate::error::{StorageError, StorageResult};
use crate::provider::{StorageCapabilities, StorageRecord, StorageService};

/// Storage service keeping every context in process memory.
///
/// Each context is guarded by its own shard lock, so operations on one key
/// are atomic with respect to each other while unrelated contexts proceed
/// in parallel. A read that finds an expired record removes it; records
/// nobody reads are removed by [`reap`](StorageService::reap),
/// [`reap_all`](Self::reap_all) or the background reaper started with
/// [`spawn_reaper`](Self::spawn_reaper).
#[derive(Debug)]
pub struct InMemoryStorageService {
    contexts: DashMap<String, HashMap<String, StorageRecord>>,
    capabilities: StorageCapabilities,
    clock: Arc<dyn Clock>,
}

impl InMemoryStorageService {
    /// Creates an empty store reading time from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            contexts: DashMap::new(),
            capabilities: StorageCapabilities::default(),
            clock,
        }
    }

    /// Overrides the advertised size limits.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: StorageCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Removes expired records from every context.
    ///
    /// Returns the number of records removed.
    pub fn reap_all(&self) -> usize {
        let now = self.clock.now_millis();
        let mut removed = 0;
        for mut context in self.contexts.iter_mut() {
            let before = context.len();
            context.retain(|_, record| !record.is_expired(now));
            removed += before - context.len();
        }
        self.contexts.retain(|_, records| !records.is_empty());
        removed
    }

    /// Returns the number of records currently held, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.iter().map(|c| c.len()).sum()
    }

    /// Returns whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starts a background thread that calls [`reap_all`](Self::reap_all)
    /// every `interval`.
    ///
    /// The thread holds only a weak reference and stops when the returned
    /// handle is dropped or the store itself is dropped.
    pub fn spawn_reaper(self: &Arc<Self>, interval: Duration) -> StorageResult<ReaperHandle> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let store: Weak<Self> = Arc::downgrade(self);

        let thread = std::thread::Builder::new()
            .name("storage-reaper".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let Some(store) = store.upgrade() else {
                            break;
                        };
                        let removed = store.reap_all();
                        if removed > 0 {
                            tracing::debug!(removed, "Reaped expired storage records");
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(|e| StorageError::Internal(format!("failed to start reaper: {e}")))?;

        Ok(ReaperHandle {
            stop: Some(stop_tx),
            thread: Some(thread),
        })
    }

    fn check_sizes(&self, context: &str, key: &str, value: Option<&str>) -> StorageResult<()> {
        if context.len() > self.capabilities.context_size {
            return Err(StorageError::Capacity(format!(
                "context length {} exceeds {}",
                context.len(),
                self.capabilities.context_size
            )));
        }
        if key.len() > self.capabilities.key_size {
            return Err(StorageError::Capacity(format!(
                "key length {} exceeds {}",
                key.len(),
                self.capabilities.key_size
            )));
        }
        if let Some(value) = value {
            if value.len() > self.capabilities.value_size {
                return Err(StorageError::Capacity(format!(
                    "value length {} exceeds {}",
                    value.len(),
                    self.capabilities.value_size
                )));
            }
        }
        Ok(())
    }

    /// Applies `f` to the live record under `key`, if any.
    fn with_live_record<T>(
        &self,
        context: &str,
        key: &str,
        f: impl FnOnce(&mut StorageRecord) -> StorageResult<T>,
    ) -> StorageResult<Option<T>> {
        let now = self.clock.now_millis();
        let Some(mut records) = self.contexts.get_mut(context) else {
            return Ok(None);
        };
        match records.get_mut(key) {
            Some(record) if !record.is_expired(now) => f(record).map(Some),
            _ => Ok(None),
        }
    }
}

impl Default for InMemoryStorageService {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl StorageService for InMemoryStorageService {
    fn capabilities(&self) -> StorageCapabilities {
        self.capabilities
    }

    fn create(
        &self,
        context: &str,
        key: &str,
        value: &str,
        expiration: Option<i64>,
    ) -> StorageResult<bool> {
        self.check_sizes(context, key, Some(value))?;
        let now = self.clock.now_millis();

        let mut records = self.contexts.entry(context.to_string()).or_default();
        if records.get(key).is_some_and(|r| !r.is_expired(now)) {
            return Ok(false);
        }
        records.insert(key.to_string(), StorageRecord::new(value, expiration));
        Ok(true)
    }

    fn read(&self, context: &str, key: &str) -> StorageResult<Option<StorageRecord>> {
        self.check_sizes(context, key, None)?;
        let now = self.clock.now_millis();
        let Some(mut records) = self.contexts.get_mut(context) else {
            return Ok(None);
        };
        if records.get(key).is_some_and(|record| record.is_expired(now)) {
            records.remove(key);
            tracing::trace!(context, key, "Evicted expired record on read");
            return Ok(None);
        }
        Ok(records.get(key).cloned())
    }

    fn update(
        &self,
        context: &str,
        key: &str,
        value: &str,
        expiration: Option<i64>,
    ) -> StorageResult<Option<u64>> {
        self.check_sizes(context, key, Some(value))?;
        self.with_live_record(context, key, |record| {
            record.value = value.to_string();
            record.expiration = expiration;
            record.version += 1;
            Ok(record.version)
        })
    }

    fn update_with_version(
        &self,
        version: u64,
        context: &str,
        key: &str,
        value: &str,
        expiration: Option<i64>,
    ) -> StorageResult<Option<u64>> {
        self.check_sizes(context, key, Some(value))?;
        self.with_live_record(context, key, |record| {
            if record.version != version {
                return Err(StorageError::VersionMismatch {
                    expected: version,
                    actual: record.version,
                });
            }
            record.value = value.to_string();
            record.expiration = expiration;
            record.version += 1;
            Ok(record.version)
        })
    }

    fn update_expiration(
        &self,
        context: &str,
        key: &str,
        expiration: Option<i64>,
    ) -> StorageResult<bool> {
        self.check_sizes(context, key, None)?;
        let updated = self.with_live_record(context, key, |record| {
            record.expiration = expiration;
            Ok(())
        })?;
        Ok(updated.is_some())
    }

    fn delete(&self, context: &str, key: &str) -> StorageResult<bool> {
        self.check_sizes(context, key, None)?;
        Ok(self
            .contexts
            .get_mut(context)
            .is_some_and(|mut records| records.remove(key).is_some()))
    }

    fn delete_with_version(
        &self,
        version: u64,
        context: &str,
        key: &str,
    ) -> StorageResult<bool> {
        self.check_sizes(context, key, None)?;
        let Some(mut records) = self.contexts.get_mut(context) else {
            return Ok(false);
        };
        match records.get(key).map(|record| record.version) {
            None => Ok(false),
            Some(actual) if actual != version => Err(StorageError::VersionMismatch {
                expected: version,
                actual,
            }),
            Some(_) => Ok(records.remove(key).is_some()),
        }
    }

    fn delete_context(&self, context: &str) -> StorageResult<()> {
        self.contexts.remove(context);
        Ok(())
    }

    fn update_context_expiration(
        &self,
        context: &str,
        expiration: Option<i64>,
    ) -> StorageResult<()> {
        let now = self.clock.now_millis();
        if let Some(mut records) = self.contexts.get_mut(context) {
            for record in records.values_mut().filter(|r| !r.is_expired(now)) {
                record.expiration = expiration;
            }
        }
        Ok(())
    }

    fn reap(&self, context: &str) -> StorageResult<usize> {
        let now = self.clock.now_millis();
        let Some(mut records) = self.contexts.get_mut(context) else {
            return Ok(0);
        };
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        Ok(before - records.len())
    }
}

/// Stops the background reaper when dropped.
#[derive(Debug)]
pub struct ReaperHandle {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Drop for ReaperHandle {
    fn drop(&mut self) {
        drop(self.stop.take());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("Storage reaper thread panicked");
            }
        }
    }
}
