//! Write-Through Updater
//!
//! Mutates a profile, persists it, then refreshes its cache snapshot.
//! The cache is written only after the persistent write succeeded, so the
//! cache never reports a value that was not durably stored.

use tracing::{info, warn};

use crate::error::{AppError, Result, StoreError};
use crate::resource::{ProfileCache, ProfileField, UserProfile};

#[derive(Clone)]
pub struct WriteThrough {
    profiles: ProfileCache,
}

impl WriteThrough {
    pub fn new(profiles: ProfileCache) -> Self {
        Self { profiles }
    }

    // == Update Field ==
    /// Sets `field` of profile `id` to `value` in both stores.
    ///
    /// # Returns
    /// - The updated profile on success
    /// - `AppError::NotFound` when the profile does not exist
    /// - `AppError::Store` when loading or persisting fails (cache untouched)
    pub async fn update_field(
        &self,
        id: &str,
        field: ProfileField,
        value: &str,
    ) -> Result<UserProfile> {
        // The lookup hands back an owned copy, never the cached bytes
        let mut profile = self
            .profiles
            .get(id)
            .await?
            .into_profile()
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        profile.apply(field, value);
        // A snapshot can outlive its row; the write then finds nothing to update
        self.profiles
            .profiles()
            .update_field(id, field, value)
            .await
            .map_err(|err| match err {
                StoreError::MissingRecord(_) => AppError::NotFound("User".to_string()),
                other => AppError::Store(other),
            })?;

        if let Err(err) = self.profiles.store(id, &profile).await {
            warn!("Write-through cache refresh failed for user {}: {}", id, err);
        } else {
            info!("Write-through refreshed user: {}", id);
        }

        Ok(profile)
    }
}
