//! In-memory Profile Store
//!
//! HashMap-backed `ProfileStore`, keyed by the id as it appears in routes.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::resource::{ProfileField, ProfileStore, UserProfile};

#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    records: RwLock<HashMap<String, UserProfile>>,
}

impl MemoryProfileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `profiles`.
    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let records = profiles
            .into_iter()
            .map(|profile| (profile.id.to_string(), profile))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    /// Inserts or replaces a profile.
    pub async fn insert(&self, profile: UserProfile) {
        self.records
            .write()
            .await
            .insert(profile.id.to_string(), profile);
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn fetch_by_id(&self, id: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn update_field(
        &self,
        id: &str,
        field: ProfileField,
        value: &str,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        match records.get_mut(id) {
            Some(profile) => {
                profile.apply(field, value);
                Ok(())
            }
            None => Err(StoreError::MissingRecord(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_and_update() {
        let store = MemoryProfileStore::with_profiles([UserProfile {
            id: 1,
            bio: None,
            ..Default::default()
        }]);

        store.update_field("1", ProfileField::Bio, "hi").await.unwrap();

        let profile = store.fetch_by_id("1").await.unwrap().unwrap();
        assert_eq!(profile.bio.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_update_missing() {
        let store = MemoryProfileStore::new();

        let result = store.update_field("1", ProfileField::Bio, "hi").await;
        assert!(matches!(result, Err(StoreError::MissingRecord(_))));
    }
}
