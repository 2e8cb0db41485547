use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

use crate::config::ApiConfig;

use super::catalog::Catalog;
use super::error::{ApiError, ApiResult};
use super::query::{Endpoint, Filters, QueryDescriptor};

/// Extra per-request settings merged over the client defaults
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
  pub headers: HeaderMap,
}

impl RequestOptions {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a header; invalid names or values are ignored
  pub fn header(mut self, name: &str, value: &str) -> Self {
    if let (Ok(name), Ok(value)) = (
      HeaderName::from_bytes(name.as_bytes()),
      HeaderValue::from_str(value),
    ) {
      self.headers.insert(name, value);
    }
    self
  }
}

/// Product API client wrapper
#[derive(Clone)]
pub struct StoreClient {
  http: reqwest::Client,
  /// Origin plus the `/api` prefix, without a trailing slash
  api_base: String,
  /// Configured headers sent with every typed call
  defaults: RequestOptions,
}

impl StoreClient {
  pub fn new(config: &ApiConfig) -> ApiResult<Self> {
    let origin = Url::parse(&config.base_url)
      .map_err(|e| ApiError::Validation(format!("invalid API url {}: {}", config.base_url, e)))?;

    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.timeout_secs {
      builder = builder.timeout(Duration::from_secs(secs));
    }
    let http = builder
      .build()
      .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

    let api_base = format!("{}/api", origin.as_str().trim_end_matches('/'));
    let defaults = config
      .headers
      .iter()
      .fold(RequestOptions::new(), |options, (name, value)| {
        options.header(name, value)
      });

    Ok(Self {
      http,
      api_base,
      defaults,
    })
  }

  /// Issue one GET against `path` (relative to the API prefix) and decode
  /// the body as JSON.
  ///
  /// `Content-Type: application/json` is always sent unless the caller
  /// supplies its own value.
  pub async fn fetch_resource(&self, path: &str, options: RequestOptions) -> ApiResult<Value> {
    let url = format!("{}{}", self.api_base, path);

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.extend(options.headers);

    debug!(%url, "GET");
    let response = self
      .http
      .get(&url)
      .headers(headers)
      .send()
      .await
      .map_err(|e| log_failure(&url, ApiError::Network(e.to_string())))?;

    let status = response.status();
    if !status.is_success() {
      return Err(log_failure(
        &url,
        ApiError::Transport {
          status: status.as_u16(),
        },
      ));
    }

    response
      .json::<Value>()
      .await
      .map_err(|e| log_failure(&url, ApiError::Network(format!("invalid JSON body: {}", e))))
  }

  async fn fetch_query(&self, query: &QueryDescriptor) -> ApiResult<Value> {
    self
      .fetch_resource(&query.path_and_query(), self.defaults.clone())
      .await
  }
}

fn log_failure(url: &str, err: ApiError) -> ApiError {
  error!(%url, status = ?err.status(), error = %err, "API error");
  err
}

#[async_trait]
impl Catalog for StoreClient {
  async fn list_products(&self, page: u32, limit: u32, filters: &Filters) -> ApiResult<Value> {
    let query = QueryDescriptor::products(page, limit, filters)?;
    self.fetch_query(&query).await
  }

  async fn get_product(&self, id: u64) -> ApiResult<Value> {
    self
      .fetch_query(&QueryDescriptor::new(Endpoint::Product(id)))
      .await
  }

  async fn list_categories(&self) -> ApiResult<Value> {
    self
      .fetch_query(&QueryDescriptor::new(Endpoint::Categories))
      .await
  }

  async fn list_brands(&self) -> ApiResult<Value> {
    self
      .fetch_query(&QueryDescriptor::new(Endpoint::Brands))
      .await
  }

  async fn product_stats(&self) -> ApiResult<Value> {
    self
      .fetch_query(&QueryDescriptor::new(Endpoint::Stats))
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use mockito::{Matcher, Server};
  use serde_json::json;

  fn client_for(server: &Server) -> StoreClient {
    StoreClient::new(&ApiConfig {
      base_url: server.url(),
      timeout_secs: Some(5),
      ..ApiConfig::default()
    })
    .unwrap()
  }

  #[test]
  fn test_api_base_appends_prefix() {
    let client = StoreClient::new(&ApiConfig {
      base_url: "http://localhost:5000/".to_string(),
      timeout_secs: None,
      ..ApiConfig::default()
    })
    .unwrap();
    assert_eq!(client.api_base, "http://localhost:5000/api");
  }

  #[test]
  fn test_invalid_base_url_is_rejected() {
    let result = StoreClient::new(&ApiConfig {
      base_url: "not a url".to_string(),
      timeout_secs: None,
      ..ApiConfig::default()
    });
    assert!(matches!(result, Err(ApiError::Validation(_))));
  }

  #[tokio::test]
  async fn test_list_products_sends_pagination_and_filters() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/api/products")
      .match_query(Matcher::AllOf(vec![
        Matcher::UrlEncoded("page".into(), "2".into()),
        Matcher::UrlEncoded("limit".into(), "12".into()),
        Matcher::UrlEncoded("category".into(), "shoes".into()),
      ]))
      .match_header("content-type", "application/json")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(json!({"products": [], "total": 0}).to_string())
      .create_async()
      .await;

    let client = client_for(&server);
    let body = client
      .list_products(2, 12, &Filters::new().with("category", "shoes"))
      .await
      .unwrap();

    assert_eq!(body, json!({"products": [], "total": 0}));
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_search_matches_list_with_search_filter() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/api/products")
      .match_query(Matcher::AllOf(vec![
        Matcher::UrlEncoded("page".into(), "1".into()),
        Matcher::UrlEncoded("limit".into(), "12".into()),
        Matcher::UrlEncoded("search".into(), "red shoes".into()),
      ]))
      .with_status(200)
      .with_body(r#"{"products": [], "total": 0}"#)
      .expect(2)
      .create_async()
      .await;

    let client = client_for(&server);
    let searched = client.search_products("red shoes", 1, 12).await.unwrap();
    let listed = client
      .list_products(1, 12, &Filters::new().search("red shoes"))
      .await
      .unwrap();

    assert_eq!(searched, listed);
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_fixed_path_endpoints() {
    let mut server = Server::new_async().await;
    let product = server
      .mock("GET", "/api/products/42")
      .with_body(r#"{"id": 42}"#)
      .create_async()
      .await;
    let categories = server
      .mock("GET", "/api/products/categories")
      .with_body("[]")
      .create_async()
      .await;
    let brands = server
      .mock("GET", "/api/products/brands")
      .with_body("[]")
      .create_async()
      .await;
    let stats = server
      .mock("GET", "/api/products/stats")
      .with_body("{}")
      .create_async()
      .await;

    let client = client_for(&server);
    assert_eq!(client.get_product(42).await.unwrap(), json!({"id": 42}));
    assert_eq!(client.list_categories().await.unwrap(), json!([]));
    assert_eq!(client.list_brands().await.unwrap(), json!([]));
    assert_eq!(client.product_stats().await.unwrap(), json!({}));

    product.assert_async().await;
    categories.assert_async().await;
    brands.assert_async().await;
    stats.assert_async().await;
  }

  #[tokio::test]
  async fn test_non_success_status_is_transport_error() {
    let mut server = Server::new_async().await;
    server
      .mock("GET", "/api/products/999")
      .with_status(404)
      .with_body(r#"{"success": false, "error": "Product not found"}"#)
      .create_async()
      .await;

    let err = client_for(&server).get_product(999).await.unwrap_err();
    assert_eq!(err, ApiError::Transport { status: 404 });
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "HTTP error! status: 404");
  }

  #[tokio::test]
  async fn test_invalid_body_is_network_error() {
    let mut server = Server::new_async().await;
    server
      .mock("GET", "/api/products/stats")
      .with_status(200)
      .with_body("<html>oops</html>")
      .create_async()
      .await;

    let err = client_for(&server).product_stats().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
  }

  #[tokio::test]
  async fn test_unreachable_host_is_network_error() {
    let client = StoreClient::new(&ApiConfig {
      base_url: "http://127.0.0.1:1".to_string(),
      timeout_secs: Some(2),
      ..ApiConfig::default()
    })
    .unwrap();

    let err = client.list_brands().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
  }

  #[tokio::test]
  async fn test_caller_headers_take_precedence() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/api/products/brands")
      .match_header("content-type", "text/plain")
      .match_header("x-request-id", "abc")
      .with_body("[]")
      .create_async()
      .await;

    let options = RequestOptions::new()
      .header("Content-Type", "text/plain")
      .header("X-Request-Id", "abc");
    client_for(&server)
      .fetch_resource("/products/brands", options)
      .await
      .unwrap();

    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_configured_headers_sent_on_typed_calls() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/api/products/stats")
      .match_header("content-type", "application/json")
      .match_header("authorization", "Bearer t0k")
      .with_body(r#"{"total_products": 0}"#)
      .create_async()
      .await;

    let mut headers = std::collections::BTreeMap::new();
    headers.insert("Authorization".to_string(), "Bearer t0k".to_string());
    headers.insert("Bad Header".to_string(), "dropped".to_string());
    let client = StoreClient::new(&ApiConfig {
      base_url: server.url(),
      headers,
      ..ApiConfig::default()
    })
    .unwrap();

    client.product_stats().await.unwrap();
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_validation_error_skips_network() {
    let server = Server::new_async().await;
    let err = client_for(&server)
      .list_products(0, 12, &Filters::new())
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
  }
}
