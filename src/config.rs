//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Namespace prepended to every key this service writes.
pub const DEFAULT_NAMESPACE: &str = "respcache";

/// Upstream endpoint for the exchange-rate route.
pub const DEFAULT_EXCHANGE_RATE_URL: &str = "https://api.coingecko.com/api/v3/exchange_rates";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// SQLite database file holding `user_profiles`
    pub database_path: String,
    /// Redis endpoint; the in-process store is used when unset
    pub redis_url: Option<String>,
    /// Cache key namespace
    pub cache_namespace: String,
    /// Whether generic routes are wrapped in the read-through cache
    pub cache_enabled: bool,
    /// TTL in seconds for the exchange-rate route
    pub exchange_rate_ttl: u64,
    /// TTL in seconds for user profile snapshots
    pub user_profile_ttl: u64,
    /// Upstream exchange-rate endpoint
    pub exchange_rate_url: String,
    /// Upstream request timeout in seconds
    pub upstream_timeout: u64,
    /// Per-operation Redis timeout in milliseconds
    pub cache_timeout_ms: u64,
    /// Sweep interval in seconds for the in-process store
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 5000)
    /// - `SQLITE_FILE` - SQLite database path (default: profiles.db)
    /// - `REDIS_URI` - Redis connection URL (default: unset, in-process store)
    /// - `CACHE_PREFIX` - Cache namespace (default: respcache)
    /// - `CACHE_ENABLED` - Read-through caching of generic routes (default: true)
    /// - `EXCHANGE_RATE_TTL` - TTL for /btc-exchange-rate/ (default: 600)
    /// - `USER_PROFILE_TTL` - TTL for user profiles (default: 300)
    /// - `EXCHANGE_RATE_URL` - Upstream endpoint (default: CoinGecko)
    /// - `UPSTREAM_TIMEOUT` - Upstream timeout in seconds (default: 10)
    /// - `CACHE_TIMEOUT_MS` - Redis operation timeout (default: 1000)
    /// - `CLEANUP_INTERVAL` - In-process sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: env_or("PORT", defaults.server_port),
            database_path: env::var("SQLITE_FILE").unwrap_or(defaults.database_path),
            redis_url: env::var("REDIS_URI").ok().filter(|url| !url.trim().is_empty()),
            cache_namespace: env::var("CACHE_PREFIX").unwrap_or(defaults.cache_namespace),
            cache_enabled: env_or("CACHE_ENABLED", defaults.cache_enabled),
            exchange_rate_ttl: env_or("EXCHANGE_RATE_TTL", defaults.exchange_rate_ttl),
            user_profile_ttl: env_or("USER_PROFILE_TTL", defaults.user_profile_ttl),
            exchange_rate_url: env::var("EXCHANGE_RATE_URL")
                .unwrap_or(defaults.exchange_rate_url),
            upstream_timeout: env_or("UPSTREAM_TIMEOUT", defaults.upstream_timeout),
            cache_timeout_ms: env_or("CACHE_TIMEOUT_MS", defaults.cache_timeout_ms),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 5000,
            database_path: "profiles.db".to_string(),
            redis_url: None,
            cache_namespace: DEFAULT_NAMESPACE.to_string(),
            cache_enabled: true,
            exchange_rate_ttl: 600,
            user_profile_ttl: 300,
            exchange_rate_url: DEFAULT_EXCHANGE_RATE_URL.to_string(),
            upstream_timeout: 10,
            cache_timeout_ms: 1000,
            cleanup_interval: 1,
        }
    }
}

/// Parses `name` from the environment, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
