//! Cache storage trait and in-memory implementation.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;

/// A stored response. Entries are replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
  pub payload: Value,
  pub created_at: Instant,
}

impl CacheEntry {
  pub fn new(payload: Value) -> Self {
    Self {
      payload,
      created_at: Instant::now(),
    }
  }
}

/// Trait for cache storage backends.
pub trait CacheStorage: Send + Sync {
  /// Get the entry stored under `key`, expired or not.
  fn get(&self, key: &str) -> Option<CacheEntry>;

  /// Store an entry, replacing whatever was there.
  fn insert(&self, key: &str, entry: CacheEntry);

  fn remove(&self, key: &str);

  /// Drop every entry.
  fn clear(&self);

  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl<S: CacheStorage + ?Sized> CacheStorage for Box<S> {
  fn get(&self, key: &str) -> Option<CacheEntry> {
    (**self).get(key)
  }

  fn insert(&self, key: &str, entry: CacheEntry) {
    (**self).insert(key, entry)
  }

  fn remove(&self, key: &str) {
    (**self).remove(key)
  }

  fn clear(&self) {
    (**self).clear()
  }

  fn len(&self) -> usize {
    (**self).len()
  }
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get(&self, _key: &str) -> Option<CacheEntry> {
    None // Always miss
  }

  fn insert(&self, _key: &str, _entry: CacheEntry) {}

  fn remove(&self, _key: &str) {}

  fn clear(&self) {}

  fn len(&self) -> usize {
    0
  }
}

/// Process-lifetime storage backed by a hash map.
///
/// Unbounded in entry count; expiry is the cache layer's job.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  // The map holds plain data, so a poisoned lock is still consistent.
  fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl CacheStorage for MemoryStorage {
  fn get(&self, key: &str) -> Option<CacheEntry> {
    self.entries().get(key).cloned()
  }

  fn insert(&self, key: &str, entry: CacheEntry) {
    self.entries().insert(key.to_string(), entry);
  }

  fn remove(&self, key: &str) {
    self.entries().remove(key);
  }

  fn clear(&self) {
    self.entries().clear();
  }

  fn len(&self) -> usize {
    self.entries().len()
  }
}
