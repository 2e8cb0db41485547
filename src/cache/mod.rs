//! Generic response cache.
//!
//! This module provides an API-agnostic caching mechanism that:
//! - Stores JSON payloads under canonical query keys
//! - Expires entries after a fixed TTL, checked lazily on read
//! - Never caches failures
//! - Can be cleared as a whole

mod layer;
mod storage;
mod traits;

pub use layer::{CacheLayer, DEFAULT_TTL};
pub use storage::{CacheStorage, MemoryStorage, NoopStorage};
pub use traits::{CacheResult, CacheSource, QueryKey};
