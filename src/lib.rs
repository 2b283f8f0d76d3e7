//! respcache - HTTP response caching for a small JSON API
//!
//! Read-through caching of successful GET responses, a cache-first facade
//! for user profiles and write-through updates that keep the cache fresh.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod resource;
pub mod tasks;
pub mod upstream;

pub use api::{create_router, AppState};
pub use cache::{CacheSettings, CacheStore, MemoryCacheStore, RedisCacheStore};
pub use config::Config;
pub use error::{AppError, StoreError};
pub use resource::{MemoryProfileStore, ProfileStore, SqliteProfileStore};
pub use tasks::spawn_cleanup_task;
pub use upstream::{ExchangeRateSource, HttpRateSource};
