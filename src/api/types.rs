//! Typed views over API payloads.
//!
//! The cache and transport deal in raw JSON; these types are what the UI
//! renders. They tolerate both the documented response shapes and the live
//! server's `{success, data, pagination}` wrapper.

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

use super::error::{ApiError, ApiResult};

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Unwrap the server's `{"success": true, "data": ...}` envelope, if present.
fn unwrap_data(payload: &Value) -> &Value {
  match payload.get("data") {
    Some(data) if payload.get("success").is_some() => data,
    _ => payload,
  }
}

fn decode<T: DeserializeOwned>(value: &Value, what: &str) -> ApiResult<T> {
  T::deserialize(value).map_err(|e| ApiError::Network(format!("malformed {} response: {}", what, e)))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
  pub id: u64,
  #[serde(default, deserialize_with = "null_as_default")]
  pub name: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub brand: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub category: String,
  #[serde(default)]
  pub department: Option<String>,
  #[serde(default, alias = "retail_price", deserialize_with = "null_as_default")]
  pub price: f64,
  #[serde(default)]
  pub sku: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub distribution_center: Option<String>,
}

impl Product {
  pub fn from_payload(payload: &Value) -> ApiResult<Self> {
    decode(unwrap_data(payload), "product")
  }
}

/// One page of a product listing plus the total match count
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
  pub products: Vec<Product>,
  pub total: u64,
}

#[derive(Deserialize)]
struct ApiPagination {
  #[serde(default)]
  total_items: u64,
}

#[derive(Deserialize)]
struct ApiProductsResponse {
  #[serde(default, alias = "data")]
  products: Vec<Product>,
  total: Option<u64>,
  pagination: Option<ApiPagination>,
}

impl ProductPage {
  pub fn from_payload(payload: &Value) -> ApiResult<Self> {
    let response: ApiProductsResponse = decode(payload, "product list")?;
    let total = response
      .total
      .or(response.pagination.map(|p| p.total_items))
      .unwrap_or(response.products.len() as u64);

    Ok(Self {
      products: response.products,
      total,
    })
  }

  /// Number of pages needed to show `total` items at `page_size` per page
  pub fn total_pages(&self, page_size: u32) -> u32 {
    if page_size == 0 {
      return 0;
    }
    self.total.div_ceil(u64::from(page_size)) as u32
  }
}

/// A category facet with its product count
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
  #[serde(default, alias = "name", deserialize_with = "null_as_default")]
  pub category: String,
  #[serde(default, alias = "product_count")]
  pub count: u64,
  #[serde(default)]
  pub avg_price: Option<f64>,
}

impl Category {
  pub fn list_from_payload(payload: &Value) -> ApiResult<Vec<Self>> {
    decode(unwrap_data(payload), "category")
  }
}

/// A brand facet with its product count
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Brand {
  #[serde(default, alias = "name", deserialize_with = "null_as_default")]
  pub brand: String,
  #[serde(default, alias = "product_count")]
  pub count: u64,
  #[serde(default)]
  pub avg_price: Option<f64>,
}

impl Brand {
  pub fn list_from_payload(payload: &Value) -> ApiResult<Vec<Self>> {
    decode(unwrap_data(payload), "brand")
  }
}

/// Catalog-wide statistics
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProductStats {
  #[serde(deserialize_with = "null_as_default")]
  pub total_products: u64,
  #[serde(deserialize_with = "null_as_default")]
  pub unique_categories: u64,
  #[serde(deserialize_with = "null_as_default")]
  pub unique_brands: u64,
  #[serde(deserialize_with = "null_as_default")]
  pub departments: u64,
  pub avg_price: Option<f64>,
  pub min_price: Option<f64>,
  pub max_price: Option<f64>,
  /// SUM over an empty table comes back as null
  #[serde(deserialize_with = "null_as_default")]
  pub men_products: u64,
  #[serde(deserialize_with = "null_as_default")]
  pub women_products: u64,
}

impl ProductStats {
  pub fn from_payload(payload: &Value) -> ApiResult<Self> {
    decode(unwrap_data(payload), "stats")
  }
}
