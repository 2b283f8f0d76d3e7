//! SQLite Profile Store
//!
//! `ProfileStore` over a sqlx SQLite pool.

use std::str::FromStr;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::info;

use crate::error::StoreError;
use crate::resource::{ProfileField, ProfileStore, UserProfile};

const CREATE_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS user_profiles (id INTEGER PRIMARY KEY, bio TEXT)";

// == SQLite Profile Store ==
#[derive(Debug, Clone)]
pub struct SqliteProfileStore {
    pool: SqlitePool,
}

impl SqliteProfileStore {
    // == Connect ==
    /// Opens (creating if needed) the database file at `path`.
    pub async fn connect(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        info!("Connected to SQLite at {}", path);

        Ok(Self::from_pool(pool))
    }

    /// Wraps an already configured pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a private in-memory database with a single connection.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // Every connection of a :memory: pool would see its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self::from_pool(pool))
    }

    /// Creates `user_profiles` when it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Inserts or replaces a profile row.
    pub async fn upsert(&self, profile: &UserProfile) -> Result<(), StoreError> {
        sqlx::query("INSERT OR REPLACE INTO user_profiles (id, bio) VALUES (?, ?)")
            .bind(profile.id)
            .bind(profile.bio.as_deref())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // == Close ==
    /// Waits for checked-out connections to return, then closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn fetch_by_id(&self, id: &str) -> Result<Option<UserProfile>, StoreError> {
        let Some(rowid) = parse_id(id) else {
            return Ok(None);
        };

        let row = sqlx::query("SELECT * FROM user_profiles WHERE id = ?")
            .bind(rowid)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn update_field(
        &self,
        id: &str,
        field: ProfileField,
        value: &str,
    ) -> Result<(), StoreError> {
        let rowid = parse_id(id).ok_or_else(|| StoreError::MissingRecord(id.to_string()))?;

        // Column names come from the closed ProfileField set
        let sql = format!("UPDATE user_profiles SET {} = ? WHERE id = ?", field.column());
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(rowid)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::MissingRecord(id.to_string()));
        }
        Ok(())
    }
}

/// Route ids that are not integers cannot name a row.
fn parse_id(id: &str) -> Option<i64> {
    id.trim().parse().ok()
}

/// Maps a whole row; columns other than `id` and `bio` land in `extra`.
fn profile_from_row(row: &SqliteRow) -> Result<UserProfile, StoreError> {
    let mut extra = Map::new();
    for column in row.columns() {
        let name = column.name();
        if name == "id" || name == "bio" {
            continue;
        }
        extra.insert(name.to_string(), column_value(row, column.ordinal())?);
    }

    Ok(UserProfile {
        id: row.try_get("id")?,
        bio: row.try_get("bio")?,
        extra,
    })
}

/// Decodes one column by the storage class of its value.
fn column_value(row: &SqliteRow, index: usize) -> Result<Value, StoreError> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let value = match raw.type_info().name() {
        "INTEGER" => Value::from(row.try_get::<i64, _>(index)?),
        "REAL" => Value::from(row.try_get::<f64, _>(index)?),
        "BLOB" => Value::String(hex::encode(row.try_get::<Vec<u8>, _>(index)?)),
        _ => Value::String(row.try_get::<String, _>(index)?),
    };
    Ok(value)
}
