//! Resource Module
//!
//! Identity-addressed records (user profiles), their persistent store
//! adapters, the cache facade that reads them and the write-through updater.

mod facade;
mod memory;
mod sqlite;
mod write_through;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

pub use facade::{Lookup, ProfileCache};
pub use memory::MemoryProfileStore;
pub use sqlite::SqliteProfileStore;
pub use write_through::WriteThrough;

// == User Profile ==
/// A user profile as stored in `user_profiles`.
///
/// Only `id` and `bio` are interpreted. Any other column of the row rides
/// along in `extra` and is serialized beside them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub bio: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Applies a single-field mutation to this copy.
    pub fn apply(&mut self, field: ProfileField, value: &str) {
        match field {
            ProfileField::Bio => self.bio = Some(value.to_string()),
        }
    }
}

// == Profile Field ==
/// Columns that may be updated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Bio,
}

impl ProfileField {
    /// Column name in `user_profiles`.
    pub fn column(self) -> &'static str {
        match self {
            ProfileField::Bio => "bio",
        }
    }
}

// == Profile Store Trait ==
/// Source of truth for user profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Loads the profile with `id`, or `None` when no such row exists.
    async fn fetch_by_id(&self, id: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Persists a new value for one field of an existing profile.
    async fn update_field(
        &self,
        id: &str,
        field: ProfileField,
        value: &str,
    ) -> Result<(), StoreError>;
}
