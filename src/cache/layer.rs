//! Cache layer that orchestrates caching logic with network fetching.

use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::storage::{CacheEntry, CacheStorage};
use super::traits::{CacheResult, QueryKey};

/// Default lifetime of a cached response (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

/// Cache layer that manages caching logic and network fetching.
///
/// Entries live for a fixed TTL. Expiry is checked lazily: the read that
/// finds an expired entry deletes it and falls through to the fetcher.
/// Nothing sweeps the store in the background.
pub struct CacheLayer<S: CacheStorage> {
  storage: Arc<S>,
  /// How long an entry stays servable
  ttl: Duration,
}

impl<S: CacheStorage> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
      ttl: DEFAULT_TTL,
    }
  }

  /// Set the time-to-live for cached data.
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  fn is_expired(&self, entry: &CacheEntry) -> bool {
    entry.created_at.elapsed() > self.ttl
  }

  /// Return the live entry for `hash`, deleting it if it has expired.
  fn lookup(&self, hash: &str) -> Option<CacheEntry> {
    let entry = self.storage.get(hash)?;
    if self.is_expired(&entry) {
      self.storage.remove(hash);
      return None;
    }
    Some(entry)
  }

  /// Fetch with cache-first strategy.
  ///
  /// 1. Live entry - return it without calling `fetcher`
  /// 2. Missing or expired - call `fetcher`
  /// 3. Store the result on success; errors are returned untouched and
  ///    leave the store as it was
  pub async fn fetch<K, F, Fut, E>(&self, key: &K, fetcher: F) -> Result<CacheResult<Value>, E>
  where
    K: QueryKey,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value, E>>,
  {
    let hash = key.cache_hash();

    if let Some(entry) = self.lookup(&hash) {
      debug!(query = %key.description(), "cache hit");
      return Ok(CacheResult::from_cache(entry.payload, entry.created_at));
    }

    debug!(query = %key.description(), "cache miss");
    let data = fetcher().await?;
    self.storage.insert(&hash, CacheEntry::new(data.clone()));
    Ok(CacheResult::from_network(data))
  }

  /// Drop every cached entry.
  pub fn clear(&self) {
    debug!(entries = self.storage.len(), "clearing cache");
    self.storage.clear();
  }

  /// Number of stored entries, including expired ones not yet read.
  pub fn entry_count(&self) -> usize {
    self.storage.len()
  }
}

impl<S: CacheStorage> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      ttl: self.ttl,
    }
  }
}
