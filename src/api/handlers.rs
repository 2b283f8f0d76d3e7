//! API Handlers
//!
//! HTTP request handlers for each endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{CacheSettings, CacheStore};
use crate::error::{AppError, Result};
use crate::models::{HealthResponse, ProfileUpdatedResponse, UpdateBioRequest};
use crate::resource::{Lookup, ProfileCache, ProfileField, ProfileStore, UserProfile, WriteThrough};
use crate::upstream::ExchangeRateSource;

/// Application state shared across all handlers.
///
/// Every store is constructed once at startup and injected here.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache store
    pub cache: Arc<dyn CacheStore>,
    /// Cache-first profile reader
    pub profiles: ProfileCache,
    /// Profile mutation path
    pub updater: WriteThrough,
    /// Exchange-rate upstream
    pub rates: Arc<dyn ExchangeRateSource>,
    /// Namespace and per-route TTLs
    pub settings: CacheSettings,
}

impl AppState {
    /// Wires the components together over the given stores.
    pub fn new(
        cache: Arc<dyn CacheStore>,
        profile_store: Arc<dyn ProfileStore>,
        rates: Arc<dyn ExchangeRateSource>,
        settings: CacheSettings,
    ) -> Self {
        let profiles = ProfileCache::new(
            cache.clone(),
            profile_store,
            &settings.namespace,
            settings.user_profile_ttl,
        );

        Self {
            cache,
            updater: WriteThrough::new(profiles.clone()),
            profiles,
            rates,
            settings,
        }
    }
}

/// Handler for GET /
pub async fn root_handler() -> &'static str {
    "Hello, World!"
}

/// Handler for GET /btc-exchange-rate/
///
/// Passes the upstream document through. Caching is applied by the
/// read-through layer in the router, not here.
pub async fn exchange_rate_handler(State(state): State<AppState>) -> Result<Json<Value>> {
    let rates = state
        .rates
        .exchange_rates()
        .await
        .map_err(|err| AppError::Upstream(err.to_string()))?;

    Ok(Json(rates))
}

/// Handler for GET /users/:id
///
/// Populates the cache on a read miss once the profile is known to exist.
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>> {
    match state.profiles.get(&id).await? {
        Lookup::Hit(profile) => Ok(Json(profile)),
        Lookup::Miss(Some(profile)) => {
            state.profiles.populate(&id, &profile).await;
            Ok(Json(profile))
        }
        Lookup::Miss(None) => Err(AppError::NotFound("User".to_string())),
    }
}

/// Handler for PUT /users/:id/bio
pub async fn update_bio_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateBioRequest>, JsonRejection>,
) -> Result<Json<ProfileUpdatedResponse>> {
    let Json(req) = payload.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;

    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let user = state
        .updater
        .update_field(&id, ProfileField::Bio, req.trimmed_bio())
        .await?;

    Ok(Json(ProfileUpdatedResponse::new(user)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
