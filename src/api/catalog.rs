use async_trait::async_trait;
use serde_json::Value;

use super::error::ApiResult;
use super::query::Filters;

/// Read operations of the product API.
///
/// Implemented by the network client and by the caching decorator, so
/// anything that takes a `Catalog` works with either.
#[async_trait]
pub trait Catalog: Send + Sync {
  /// One page of products. Filters never override `page` or `limit`.
  async fn list_products(&self, page: u32, limit: u32, filters: &Filters) -> ApiResult<Value>;

  async fn get_product(&self, id: u64) -> ApiResult<Value>;

  async fn list_categories(&self) -> ApiResult<Value>;

  async fn list_brands(&self) -> ApiResult<Value>;

  async fn product_stats(&self) -> ApiResult<Value>;

  /// Free-text search; same request as `list_products` with a `search` filter
  async fn search_products(&self, query: &str, page: u32, limit: u32) -> ApiResult<Value> {
    self
      .list_products(page, limit, &Filters::new().search(query))
      .await
  }
}
