//! Product API access: the network client, its caching decorator and the
//! envelope the UI consumes.

pub mod cached_client;
pub mod catalog;
pub mod client;
pub mod envelope;
pub mod error;
pub mod query;
pub mod types;

pub use cached_client::StoreCatalog;
pub use catalog::Catalog;
pub use error::{ApiError, ApiResult};
pub use query::{FilterKey, Filters};
