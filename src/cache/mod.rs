//! Cache Module
//!
//! Store adapters, key derivation and the read-through middleware.

mod entry;
mod key;
mod memory;
mod middleware;
mod redis;


use async_trait::async_trait;

use crate::config::Config;
use crate::error::StoreError;

// Re-export public types
pub use entry::CacheEntry;
pub use key::{derive_key, namespaced, HeaderScope, RequestShape, PER_REQUEST_HEADERS};
pub use memory::MemoryCacheStore;
pub use middleware::{read_through, ReadThrough};
pub use redis::RedisCacheStore;

// == Public Constants ==
/// Largest request body buffered for key derivation
pub const MAX_REQUEST_BODY: usize = 1024 * 1024; // 1 MB

// == Cache Store Trait ==
/// TTL-capable key-value store.
///
/// Implementations own expiry; callers never evict.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the live value for `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stores `value` under `key` for `ttl_secs` seconds, replacing any previous value.
    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> Result<(), StoreError>;
}

// == Cache Settings ==
/// Namespace and per-route TTLs handed to every caching component.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Prefix shared by every key this service writes
    pub namespace: String,
    /// Wrap generic routes in the read-through middleware
    pub enabled: bool,
    /// TTL in seconds for `/btc-exchange-rate/`
    pub exchange_rate_ttl: u64,
    /// TTL in seconds for user profile snapshots
    pub user_profile_ttl: u64,
}

impl CacheSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            namespace: config.cache_namespace.clone(),
            enabled: config.cache_enabled,
            exchange_rate_ttl: config.exchange_rate_ttl,
            user_profile_ttl: config.user_profile_ttl,
        }
    }
}
