//! Query descriptors: the (endpoint, parameters) identity of an API call.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use url::form_urlencoded;

use crate::cache::QueryKey;

use super::error::{ApiError, ApiResult};

/// Remote resources exposed under the `/api` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
  Products,
  Product(u64),
  Categories,
  Brands,
  Stats,
}

impl Endpoint {
  /// Short name used as the cache key prefix
  pub fn name(&self) -> &'static str {
    match self {
      Endpoint::Products => "products",
      Endpoint::Product(_) => "product",
      Endpoint::Categories => "categories",
      Endpoint::Brands => "brands",
      Endpoint::Stats => "stats",
    }
  }

  pub fn path(&self) -> String {
    match self {
      Endpoint::Products => "/products".to_string(),
      Endpoint::Product(id) => format!("/products/{}", id),
      Endpoint::Categories => "/products/categories".to_string(),
      Endpoint::Brands => "/products/brands".to_string(),
      Endpoint::Stats => "/products/stats".to_string(),
    }
  }
}

/// Listing filters the product endpoint understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
  Category,
  Brand,
  Department,
  PriceRange,
  MinPrice,
  MaxPrice,
  Search,
}

impl FilterKey {
  /// Query parameter name sent to the server
  pub fn as_str(&self) -> &'static str {
    match self {
      FilterKey::Category => "category",
      FilterKey::Brand => "brand",
      FilterKey::Department => "department",
      FilterKey::PriceRange => "price_range",
      FilterKey::MinPrice => "min_price",
      FilterKey::MaxPrice => "max_price",
      FilterKey::Search => "search",
    }
  }

  /// Check a value before it is stored. Blank always passes since it
  /// clears the filter; price bounds must be non-negative numbers.
  pub fn validate(&self, value: &str) -> ApiResult<()> {
    let value = value.trim();
    let numeric = matches!(self, FilterKey::MinPrice | FilterKey::MaxPrice);
    if !numeric || value.is_empty() {
      return Ok(());
    }
    match value.parse::<f64>() {
      Ok(n) if n.is_finite() && n >= 0.0 => Ok(()),
      _ => Err(ApiError::Validation(format!(
        "{} must be a non-negative number, got '{}'",
        self.as_str(),
        value
      ))),
    }
  }
}

/// Product listing filters.
///
/// Values are kept in a sorted map, so two filter sets with the same pairs
/// are equal no matter the order they were set in. Blank values are treated
/// as "filter not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
  values: BTreeMap<String, String>,
}

impl Filters {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set an arbitrary parameter, or clear it when `value` is blank
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    let key = key.into();
    let value = value.into();
    if value.trim().is_empty() {
      self.values.remove(&key);
    } else {
      self.values.insert(key, value.trim().to_string());
    }
  }

  /// Set one of the known filters, or clear it when `value` is blank.
  ///
  /// Price bounds that don't parse as a non-negative number are rejected and
  /// leave the filters unchanged.
  pub fn set(&mut self, key: FilterKey, value: &str) -> ApiResult<()> {
    key.validate(value)?;
    self.insert(key.as_str(), value);
    Ok(())
  }

  pub fn get(&self, key: FilterKey) -> Option<&str> {
    self.values.get(key.as_str()).map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .values
      .iter()
      .map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.insert(key, value);
    self
  }

  pub fn search(self, query: impl Into<String>) -> Self {
    self.with(FilterKey::Search.as_str(), query)
  }
}

/// A single addressable request against the product API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
  endpoint: Endpoint,
  params: BTreeMap<String, String>,
}

impl QueryDescriptor {
  pub fn new(endpoint: Endpoint) -> Self {
    Self {
      endpoint,
      params: BTreeMap::new(),
    }
  }

  /// Build the descriptor for a product listing.
  ///
  /// Filters go in first and pagination last, so `page` and `limit` always
  /// come from the arguments even if a filter tries to set them.
  pub fn products(page: u32, limit: u32, filters: &Filters) -> ApiResult<Self> {
    if page == 0 {
      return Err(ApiError::Validation("page must be at least 1".to_string()));
    }
    if limit == 0 {
      return Err(ApiError::Validation("limit must be at least 1".to_string()));
    }

    let mut query = Self::new(Endpoint::Products);
    for (key, value) in filters.iter() {
      query = query.with_param(key, value);
    }
    Ok(
      query
        .with_param("page", page.to_string())
        .with_param("limit", limit.to_string()),
    )
  }

  pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.params.insert(key.into(), value.into());
    self
  }

  /// Path plus url-encoded query string, relative to the API prefix
  pub fn path_and_query(&self) -> String {
    let path = self.endpoint.path();
    if self.params.is_empty() {
      return path;
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in &self.params {
      serializer.append_pair(key, value);
    }
    format!("{}?{}", path, serializer.finish())
  }

  /// Parameters as JSON with sorted keys
  pub fn canonical_params(&self) -> String {
    serde_json::to_string(&self.params).unwrap_or_default()
  }
}

impl QueryKey for QueryDescriptor {
  fn cache_hash(&self) -> String {
    let input = format!("{}_{}", self.endpoint.name(), self.canonical_params());

    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
  }

  fn description(&self) -> String {
    if self.params.is_empty() {
      self.endpoint.name().to_string()
    } else {
      format!("{} {}", self.endpoint.name(), self.canonical_params())
    }
  }
}
