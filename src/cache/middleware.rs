//! Read-Through Middleware
//!
//! Serves a stored payload when the derived key is present; otherwise runs
//! the wrapped handler and stores its body when the status is 2xx.
//! Any cache failure degrades to a miss, never to a failed request.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, info, warn};

use crate::cache::{derive_key, namespaced, CacheStore, HeaderScope, RequestShape, MAX_REQUEST_BODY};
use crate::error::AppError;

// == Read Through ==
/// Options and store handle for one wrapped route.
#[derive(Clone)]
pub struct ReadThrough {
    store: Arc<dyn CacheStore>,
    namespace: Arc<str>,
    ttl_secs: u64,
    scope: Arc<HeaderScope>,
}

impl ReadThrough {
    /// Creates the options for a wrapped route.
    ///
    /// # Arguments
    /// * `store` - Shared cache store
    /// * `namespace` - Prefix applied to every derived key
    /// * `ttl_secs` - Lifetime of entries written by this route
    pub fn new(store: Arc<dyn CacheStore>, namespace: &str, ttl_secs: u64) -> Self {
        Self {
            store,
            namespace: Arc::from(namespace),
            ttl_secs,
            scope: Arc::new(HeaderScope::default()),
        }
    }

    /// Replaces the default header scope used for key derivation.
    pub fn with_header_scope(mut self, scope: HeaderScope) -> Self {
        self.scope = Arc::new(scope);
        self
    }
}

/// Middleware function; attach with `axum::middleware::from_fn_with_state`.
pub async fn read_through(
    State(cache): State<ReadThrough>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_REQUEST_BODY).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return AppError::InvalidRequest("Request body too large".to_string()).into_response()
        }
    };

    let shape = RequestShape::from_parts(&parts, &body, &cache.scope);
    let key = namespaced(&cache.namespace, &derive_key(&shape));
    debug!("Cache key is {}", key);

    match cache.store.get(&key).await {
        Ok(Some(payload)) => {
            info!("Cache hit for {}", parts.uri);
            return cached_response(payload);
        }
        Ok(None) => info!("Cache miss for {}", parts.uri),
        Err(err) => warn!("Cache read failed for {}, treating as miss: {}", key, err),
    }

    let response = next.run(Request::from_parts(parts, Body::from(body))).await;

    // Failures are forwarded untouched and never stored
    if !response.status().is_success() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => return AppError::Internal(format!("response body: {}", err)).into_response(),
    };

    if let Err(err) = cache.store.set(&key, bytes.to_vec(), cache.ttl_secs).await {
        warn!("Cache write failed for {}: {}", key, err);
    }

    Response::from_parts(parts, Body::from(bytes))
}

/// Builds the 200 response for a stored payload.
fn cached_response(payload: Vec<u8>) -> Response {
    let content_type = if serde_json::from_slice::<serde_json::Value>(&payload).is_ok() {
        HeaderValue::from_static("application/json")
    } else {
        HeaderValue::from_static("text/plain; charset=utf-8")
    };

    (StatusCode::OK, [(CONTENT_TYPE, content_type)], payload).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;
    use crate::error::StoreError;
    use async_trait::async_trait;
    use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::util::ServiceExt;

    struct FailingStore;

    #[async_trait]
    impl CacheStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }

        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: u64) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
    }

    fn counting_app(store: Arc<dyn CacheStore>, status: StatusCode) -> (Router, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                (status, Json(json!({ "calls": n })))
            }
        };

        let options = ReadThrough::new(store, "test", 60);
        let app = Router::new().route(
            "/data",
            get(handler).layer(from_fn_with_state(options, read_through)),
        );
        (app, calls)
    }

    async fn call(app: &Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_hit_skips_handler() {
        let store = Arc::new(MemoryCacheStore::new());
        let (app, calls) = counting_app(store.clone(), StatusCode::OK);

        let (_, first) = call(&app, "/data").await;
        let (status, second) = call(&app, "/data").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_prepopulated_entry_is_served_without_handler() {
        let store = Arc::new(MemoryCacheStore::new());
        let (app, calls) = counting_app(store.clone(), StatusCode::OK);

        let (parts, _) = Request::builder().uri("/data").body(()).unwrap().into_parts();
        let shape = RequestShape::from_parts(&parts, b"", &HeaderScope::default());
        let key = namespaced("test", &derive_key(&shape));
        store.set(&key, br#"{"calls":99}"#.to_vec(), 60).await.unwrap();

        let (status, body) = call(&app, "/data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["calls"], 99);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_distinct_queries_are_cached_separately() {
        let store = Arc::new(MemoryCacheStore::new());
        let (app, calls) = counting_app(store.clone(), StatusCode::OK);

        call(&app, "/data?page=1").await;
        call(&app, "/data?page=2").await;
        call(&app, "/data?page=1").await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let store = Arc::new(MemoryCacheStore::new());
        let (app, calls) = counting_app(store.clone(), StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = call(&app, "/data").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        call(&app, "/data").await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_client_error_is_not_cached() {
        let store = Arc::new(MemoryCacheStore::new());
        let (app, _) = counting_app(store.clone(), StatusCode::NOT_FOUND);

        let (status, _) = call(&app, "/data").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_unavailable_store_degrades_to_miss() {
        let (app, calls) = counting_app(Arc::new(FailingStore), StatusCode::OK);

        let (status, body) = call(&app, "/data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["calls"], 1);

        let (status, body) = call(&app, "/data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["calls"], 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cached_response_content_type() {
        let json = cached_response(br#"{"a":1}"#.to_vec());
        assert_eq!(json.headers()[CONTENT_TYPE], "application/json");

        let text = cached_response(b"Hello, World!".to_vec());
        assert_eq!(text.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
    }
}
