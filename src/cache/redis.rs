//! Redis Cache Store
//!
//! Backs the `CacheStore` trait with Redis, relying on `SETEX` for expiry.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use tracing::info;

use crate::cache::CacheStore;
use crate::error::StoreError;

// == Redis Cache Store ==
/// Redis-backed store sharing one multiplexed connection across requests.
#[derive(Clone)]
pub struct RedisCacheStore {
    conn: MultiplexedConnection,
    /// Upper bound for a single command round-trip
    timeout: Duration,
}

impl RedisCacheStore {
    // == Connect ==
    /// Opens a multiplexed connection and verifies it with `PING`.
    ///
    /// # Arguments
    /// * `url` - Redis URL, e.g. `redis://localhost:6379`
    /// * `timeout` - Budget applied to the handshake and to every command
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::open(url)?;
        let store = Self {
            conn: with_timeout(timeout, client.get_multiplexed_async_connection()).await?,
            timeout,
        };

        let mut conn = store.conn.clone();
        let _pong: String = with_timeout(timeout, redis::cmd("PING").query_async(&mut conn)).await?;
        info!("Connected to Redis");

        Ok(store)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();
        with_timeout(self.timeout, conn.get(key)).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> Result<(), StoreError> {
        if ttl_secs == 0 {
            return Err(StoreError::InvalidTtl);
        }

        let mut conn = self.conn.clone();
        with_timeout(self.timeout, conn.set_ex(key, value, ttl_secs)).await
    }
}

/// Runs a Redis future under `timeout`, folding both failure kinds into `StoreError`.
async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(StoreError::Timeout(timeout.as_millis() as u64)),
    }
}
