//! API Routes
//!
//! Configures the Axum router and attaches the read-through layer to the
//! routes that use it.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    exchange_rate_handler, get_user_handler, health_handler, root_handler, update_bio_handler,
    AppState,
};
use crate::cache::{read_through, ReadThrough};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Greeting
/// - `GET /btc-exchange-rate/` - Upstream rates, read-through cached
/// - `GET /users/:id` - User profile, cached by id
/// - `PUT /users/:id/bio` - Bio update with write-through
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let exchange_rate = if state.settings.enabled {
        let options = ReadThrough::new(
            state.cache.clone(),
            &state.settings.namespace,
            state.settings.exchange_rate_ttl,
        );
        get(exchange_rate_handler).layer(from_fn_with_state(options, read_through))
    } else {
        get(exchange_rate_handler)
    };

    Router::new()
        .route("/", get(root_handler))
        .route("/btc-exchange-rate/", exchange_rate)
        .route("/users/:id", get(get_user_handler))
        .route("/users/:id/bio", put(update_bio_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheSettings, MemoryCacheStore};
    use crate::resource::MemoryProfileStore;
    use crate::upstream::{ExchangeRateSource, UpstreamError};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    #[derive(Default)]
    struct CountingRates(AtomicUsize);

    #[async_trait]
    impl ExchangeRateSource for CountingRates {
        async fn exchange_rates(&self) -> Result<Value, UpstreamError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "rates": {} }))
        }
    }

    fn create_test_app(enabled: bool) -> (Router, Arc<CountingRates>) {
        let rates = Arc::new(CountingRates::default());
        let settings = CacheSettings {
            namespace: "test".to_string(),
            enabled,
            exchange_rate_ttl: 600,
            user_profile_ttl: 300,
        };
        let state = AppState::new(
            Arc::new(MemoryCacheStore::new()),
            Arc::new(MemoryProfileStore::new()),
            rates.clone(),
            settings,
        );
        (create_router(state), rates)
    }

    async fn get_status(app: &Router, uri: &str) -> StatusCode {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _) = create_test_app(true);
        assert_eq!(get_status(&app, "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let (app, _) = create_test_app(true);
        assert_eq!(get_status(&app, "/").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_exchange_rate_cached_when_enabled() {
        let (app, rates) = create_test_app(true);

        assert_eq!(get_status(&app, "/btc-exchange-rate/").await, StatusCode::OK);
        assert_eq!(get_status(&app, "/btc-exchange-rate/").await, StatusCode::OK);
        assert_eq!(rates.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exchange_rate_uncached_when_disabled() {
        let (app, rates) = create_test_app(false);

        get_status(&app, "/btc-exchange-rate/").await;
        get_status(&app, "/btc-exchange-rate/").await;
        assert_eq!(rates.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let (app, _) = create_test_app(true);
        assert_eq!(get_status(&app, "/users/nonexistent").await, StatusCode::NOT_FOUND);
    }
}
