//! Profile Cache Facade
//!
//! Reads user profiles by id, cache first, falling back to the persistent
//! store. Reads never write to the cache; callers populate it once they know
//! the profile exists.

use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::{namespaced, CacheStore};
use crate::error::StoreError;
use crate::resource::{ProfileStore, UserProfile};

// == Lookup ==
/// Outcome of a profile read.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Served from the cache
    Hit(UserProfile),
    /// Served by the persistent store; `None` when the profile does not exist
    Miss(Option<UserProfile>),
}

impl Lookup {
    /// True when the profile came from the cache.
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    /// Drops the hit flag, keeping the profile if one was found.
    pub fn into_profile(self) -> Option<UserProfile> {
        match self {
            Lookup::Hit(profile) => Some(profile),
            Lookup::Miss(profile) => profile,
        }
    }
}

// == Profile Cache ==
/// Cache-first reader for user profiles.
#[derive(Clone)]
pub struct ProfileCache {
    cache: Arc<dyn CacheStore>,
    profiles: Arc<dyn ProfileStore>,
    namespace: Arc<str>,
    ttl_secs: u64,
}

impl ProfileCache {
    /// # Arguments
    /// * `cache` - Shared cache store
    /// * `profiles` - Source of truth
    /// * `namespace` - Cache key prefix
    /// * `ttl_secs` - Lifetime of every profile snapshot written
    pub fn new(
        cache: Arc<dyn CacheStore>,
        profiles: Arc<dyn ProfileStore>,
        namespace: &str,
        ttl_secs: u64,
    ) -> Self {
        Self {
            cache,
            profiles,
            namespace: Arc::from(namespace),
            ttl_secs,
        }
    }

    /// Cache key of the profile with `id`.
    pub fn key(&self, id: &str) -> String {
        namespaced(&self.namespace, &format!("user:{}", id))
    }

    /// The persistent store behind the cache.
    pub fn profiles(&self) -> &dyn ProfileStore {
        self.profiles.as_ref()
    }

    // == Get ==
    /// Looks the profile up in the cache, then in the persistent store.
    ///
    /// Cache failures and undecodable snapshots count as misses; only
    /// persistent store failures are returned.
    pub async fn get(&self, id: &str) -> Result<Lookup, StoreError> {
        let key = self.key(id);

        match self.cache.get(&key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<UserProfile>(&bytes) {
                Ok(profile) => {
                    info!("Cache hit for user: {}", id);
                    return Ok(Lookup::Hit(profile));
                }
                Err(err) => warn!("Discarding unreadable snapshot at {}: {}", key, err),
            },
            Ok(None) => {}
            Err(err) => warn!("Cache read failed for {}, treating as miss: {}", key, err),
        }

        info!("Cache miss for user: {}", id);
        let profile = self.profiles.fetch_by_id(id).await?;
        Ok(Lookup::Miss(profile))
    }

    // == Store Snapshot ==
    /// Writes `profile` under the key for `id` with a fresh TTL.
    pub async fn store(&self, id: &str, profile: &UserProfile) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(profile)?;
        self.cache.set(&self.key(id), bytes, self.ttl_secs).await
    }

    /// Like [`ProfileCache::store`], logging instead of failing.
    pub async fn populate(&self, id: &str, profile: &UserProfile) {
        if let Err(err) = self.store(id, profile).await {
            warn!("Cache write failed for user {}: {}", id, err);
        }
    }
}
