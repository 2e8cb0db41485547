//! Cached catalog that wraps any `Catalog` with transparent caching.

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

use crate::cache::{CacheLayer, CacheResult, CacheStorage, MemoryStorage, NoopStorage};
use crate::config::Config;

use super::catalog::Catalog;
use super::client::StoreClient;
use super::error::ApiResult;
use super::query::{Endpoint, Filters, QueryDescriptor};

/// Catalog with transparent response caching.
///
/// Product listings, categories, brands and stats are memoized for the
/// cache TTL. Single product lookups and searches always go to the inner
/// catalog.
///
/// Concurrent misses on the same key are not coalesced; each one reaches
/// the inner catalog and the last write wins.
pub struct CachedCatalog<C, S = MemoryStorage>
where
  S: CacheStorage,
{
  inner: C,
  cache: CacheLayer<S>,
}

/// The catalog the application runs with
pub type StoreCatalog = CachedCatalog<StoreClient, Box<dyn CacheStorage>>;

impl<C: Catalog, S: CacheStorage> CachedCatalog<C, S> {
  pub fn with_storage(inner: C, storage: S) -> Self {
    Self {
      inner,
      cache: CacheLayer::new(storage),
    }
  }

  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.cache = self.cache.with_ttl(ttl);
    self
  }

  /// Drop every cached response.
  pub fn clear(&self) {
    self.cache.clear();
  }

  pub fn cached_entries(&self) -> usize {
    self.cache.entry_count()
  }

  /// `list_products`, also reporting whether the page came from the cache
  pub async fn fetch_with_source(
    &self,
    page: u32,
    limit: u32,
    filters: &Filters,
  ) -> ApiResult<CacheResult<Value>> {
    let key = QueryDescriptor::products(page, limit, filters)?;
    self
      .cache
      .fetch(&key, || self.inner.list_products(page, limit, filters))
      .await
  }

  async fn fetch_fixed<F, Fut>(&self, endpoint: Endpoint, fetcher: F) -> ApiResult<CacheResult<Value>>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ApiResult<Value>>,
  {
    self
      .cache
      .fetch(&QueryDescriptor::new(endpoint), fetcher)
      .await
  }
}

impl StoreCatalog {
  /// Build the network client and its cache from configuration.
  pub fn from_config(config: &Config) -> ApiResult<Self> {
    let client = StoreClient::new(&config.api)?;
    let storage: Box<dyn CacheStorage> = if config.cache.enabled {
      Box::new(MemoryStorage::new())
    } else {
      Box::new(NoopStorage)
    };

    Ok(Self::with_storage(client, storage).with_ttl(config.cache.ttl()))
  }
}

#[async_trait]
impl<C, S> Catalog for CachedCatalog<C, S>
where
  C: Catalog,
  S: CacheStorage + 'static,
{
  async fn list_products(&self, page: u32, limit: u32, filters: &Filters) -> ApiResult<Value> {
    Ok(self.fetch_with_source(page, limit, filters).await?.data)
  }

  /// Not cached
  async fn get_product(&self, id: u64) -> ApiResult<Value> {
    self.inner.get_product(id).await
  }

  async fn list_categories(&self) -> ApiResult<Value> {
    Ok(
      self
        .fetch_fixed(Endpoint::Categories, || self.inner.list_categories())
        .await?
        .data,
    )
  }

  async fn list_brands(&self) -> ApiResult<Value> {
    Ok(
      self
        .fetch_fixed(Endpoint::Brands, || self.inner.list_brands())
        .await?
        .data,
    )
  }

  async fn product_stats(&self) -> ApiResult<Value> {
    Ok(
      self
        .fetch_fixed(Endpoint::Stats, || self.inner.product_stats())
        .await?
        .data,
    )
  }

  /// Not cached
  async fn search_products(&self, query: &str, page: u32, limit: u32) -> ApiResult<Value> {
    self.inner.search_products(query, page, limit).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::ProductPage;
  use crate::api::ApiError;
  use crate::cache::{CacheSource, DEFAULT_TTL};
  use serde_json::json;
  use std::collections::HashMap;
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::{Arc, Mutex};

  /// Stub catalog that records every call it receives.
  #[derive(Clone, Default)]
  struct StubCatalog {
    calls: Arc<Mutex<HashMap<&'static str, u32>>>,
    failing: Arc<AtomicBool>,
    delay: Option<Duration>,
  }

  impl StubCatalog {
    fn calls(&self, op: &'static str) -> u32 {
      self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    fn set_failing(&self, failing: bool) {
      self.failing.store(failing, Ordering::SeqCst);
    }

    async fn respond(&self, op: &'static str, payload: Value) -> ApiResult<Value> {
      let n = {
        let mut calls = self.calls.lock().unwrap();
        let n = calls.entry(op).or_insert(0);
        *n += 1;
        *n
      };
      if let Some(delay) = self.delay {
        tokio::time::sleep(delay).await;
      }
      if self.failing.load(Ordering::SeqCst) {
        return Err(ApiError::Transport { status: 503 });
      }
      Ok(json!({ "op": op, "call": n, "payload": payload }))
    }
  }

  #[async_trait]
  impl Catalog for StubCatalog {
    async fn list_products(&self, page: u32, limit: u32, filters: &Filters) -> ApiResult<Value> {
      let filters: HashMap<_, _> = filters.iter().collect();
      self
        .respond(
          "list_products",
          json!({
            "products": [{"id": 1}, {"id": 2}, {"id": 3}],
            "total": 30,
            "page": page,
            "limit": limit,
            "filters": filters,
          }),
        )
        .await
    }

    async fn get_product(&self, id: u64) -> ApiResult<Value> {
      self.respond("get_product", json!({ "id": id })).await
    }

    async fn list_categories(&self) -> ApiResult<Value> {
      self.respond("list_categories", json!([])).await
    }

    async fn list_brands(&self) -> ApiResult<Value> {
      self.respond("list_brands", json!([])).await
    }

    async fn product_stats(&self) -> ApiResult<Value> {
      self.respond("product_stats", json!({})).await
    }
  }

  fn cached() -> (StubCatalog, CachedCatalog<StubCatalog>) {
    let stub = StubCatalog::default();
    (stub.clone(), CachedCatalog::with_storage(stub, MemoryStorage::new()))
  }

  #[tokio::test]
  async fn test_second_call_is_served_from_cache() {
    let (stub, catalog) = cached();
    let filters = Filters::new().with("category", "shoes");

    let first = catalog.list_products(1, 12, &filters).await.unwrap();
    let second = catalog.list_products(1, 12, &filters).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
      serde_json::to_vec(&first).unwrap(),
      serde_json::to_vec(&second).unwrap()
    );
    assert_eq!(stub.calls("list_products"), 1);
  }

  #[tokio::test]
  async fn test_fixed_endpoints_are_cached_separately() {
    let (stub, catalog) = cached();

    for _ in 0..3 {
      catalog.list_categories().await.unwrap();
      catalog.list_brands().await.unwrap();
      catalog.product_stats().await.unwrap();
    }

    assert_eq!(stub.calls("list_categories"), 1);
    assert_eq!(stub.calls("list_brands"), 1);
    assert_eq!(stub.calls("product_stats"), 1);
    assert_eq!(catalog.cached_entries(), 3);
  }

  #[tokio::test(start_paused = true)]
  async fn test_expired_entry_hits_network_again() {
    let (stub, catalog) = cached();

    catalog.list_brands().await.unwrap();
    tokio::time::advance(DEFAULT_TTL + Duration::from_millis(1)).await;
    let refreshed = catalog.list_brands().await.unwrap();

    assert_eq!(stub.calls("list_brands"), 2);
    assert_eq!(refreshed["call"], 2);
  }

  #[tokio::test(start_paused = true)]
  async fn test_custom_ttl() {
    let stub = StubCatalog::default();
    let catalog = CachedCatalog::with_storage(stub.clone(), MemoryStorage::new())
      .with_ttl(Duration::from_secs(10));

    catalog.product_stats().await.unwrap();
    tokio::time::advance(Duration::from_secs(5)).await;
    catalog.product_stats().await.unwrap();
    assert_eq!(stub.calls("product_stats"), 1);

    tokio::time::advance(Duration::from_secs(6)).await;
    catalog.product_stats().await.unwrap();
    assert_eq!(stub.calls("product_stats"), 2);
  }

  #[tokio::test]
  async fn test_filter_order_shares_cache_entry() {
    let (stub, catalog) = cached();

    let a = Filters::new().with("category", "shoes").with("brand", "acme");
    let b = Filters::new().with("brand", "acme").with("category", "shoes");
    catalog.list_products(1, 12, &a).await.unwrap();
    catalog.list_products(1, 12, &b).await.unwrap();

    assert_eq!(stub.calls("list_products"), 1);
  }

  #[tokio::test]
  async fn test_clear_forces_refetch() {
    let (stub, catalog) = cached();

    catalog.list_products(1, 12, &Filters::new()).await.unwrap();
    catalog.list_categories().await.unwrap();
    catalog.clear();
    assert_eq!(catalog.cached_entries(), 0);

    catalog.list_products(1, 12, &Filters::new()).await.unwrap();
    catalog.list_categories().await.unwrap();

    assert_eq!(stub.calls("list_products"), 2);
    assert_eq!(stub.calls("list_categories"), 2);
  }

  #[tokio::test]
  async fn test_get_product_is_never_cached() {
    let (stub, catalog) = cached();

    catalog.get_product(42).await.unwrap();
    catalog.get_product(42).await.unwrap();

    assert_eq!(stub.calls("get_product"), 2);
    assert_eq!(catalog.cached_entries(), 0);
  }

  #[tokio::test]
  async fn test_search_is_never_cached() {
    let (stub, catalog) = cached();

    catalog.search_products("boots", 1, 12).await.unwrap();
    catalog.search_products("boots", 1, 12).await.unwrap();

    // The stub's default search goes through its own list_products
    assert_eq!(stub.calls("list_products"), 2);
    assert_eq!(catalog.cached_entries(), 0);
  }

  #[tokio::test]
  async fn test_failure_is_not_cached_and_retried() {
    let (stub, catalog) = cached();

    stub.set_failing(true);
    let err = catalog.list_categories().await.unwrap_err();
    assert_eq!(err, ApiError::Transport { status: 503 });
    assert_eq!(catalog.cached_entries(), 0);

    stub.set_failing(false);
    catalog.list_categories().await.unwrap();
    assert_eq!(stub.calls("list_categories"), 2);
    assert_eq!(catalog.cached_entries(), 1);
  }

  #[tokio::test]
  async fn test_invalid_pagination_never_reaches_inner() {
    let (stub, catalog) = cached();

    let err = catalog.list_products(0, 12, &Filters::new()).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(stub.calls("list_products"), 0);
  }

  #[tokio::test]
  async fn test_concurrent_identical_misses_are_not_coalesced() {
    let stub = StubCatalog {
      delay: Some(Duration::from_millis(20)),
      ..Default::default()
    };
    let catalog = CachedCatalog::with_storage(stub.clone(), MemoryStorage::new());
    let filters = Filters::new();

    let (a, b) = futures::join!(
      catalog.list_products(1, 12, &filters),
      catalog.list_products(1, 12, &filters)
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(stub.calls("list_products"), 2);
    assert_eq!(catalog.cached_entries(), 1);
  }

  #[tokio::test]
  async fn test_shoe_listing_scenario() {
    let (stub, catalog) = cached();
    let filters = Filters::new().with("category", "shoes");

    let first = catalog.fetch_with_source(1, 12, &filters).await.unwrap();
    assert_eq!(first.source, CacheSource::Network);
    let page = ProductPage::from_payload(&first.data["payload"]).unwrap();
    assert_eq!(page.products.len(), 3);
    assert_eq!(page.total_pages(12), 3);

    let again = catalog.fetch_with_source(1, 12, &filters).await.unwrap();
    assert_eq!(again.source, CacheSource::Cache);

    let second_page = catalog.fetch_with_source(2, 12, &filters).await.unwrap();
    assert_eq!(second_page.source, CacheSource::Network);
    assert_eq!(stub.calls("list_products"), 2);
  }

  #[tokio::test]
  async fn test_disabled_cache_always_delegates() {
    let stub = StubCatalog::default();
    let catalog = CachedCatalog::with_storage(stub.clone(), NoopStorage);

    catalog.list_brands().await.unwrap();
    catalog.list_brands().await.unwrap();

    assert_eq!(stub.calls("list_brands"), 2);
  }
}
