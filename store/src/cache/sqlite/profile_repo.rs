//! SQLite-backed cache for user profiles.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use super::helpers::{decode_ts, encode_ts};
use crate::cache::models::{CachedProfile, ProfileData};
use crate::cache::traits::ProfileRepository;
use crate::cache::StoreError;

/// How long a cached profile stays fresh.
const PROFILE_TTL_HOURS: i64 = 24;

/// SQLite implementation of [`ProfileRepository`].
pub struct SqliteProfileRepository {
    pool: SqlitePool,
}

impl SqliteProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ProfileRepository for SqliteProfileRepository {
    async fn save_profile(&self, user_id: &str, data: &ProfileData) -> Result<(), StoreError> {
        let now = encode_ts(Utc::now());

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO user_profiles
                (user_id, display_name, avatar_url, profile_url, last_synced_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(&data.display_name)
        .bind(&data.avatar_url)
        .bind(&data.profile_url)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn load_profile(&self, user_id: &str) -> Result<Option<CachedProfile>, StoreError> {
        let cutoff = encode_ts(Utc::now() - Duration::hours(PROFILE_TTL_HOURS));

        let row: Option<(String, String, Option<String>, Option<String>, String)> =
            sqlx::query_as(
                r#"
                SELECT user_id, display_name, avatar_url, profile_url, last_synced_at
                FROM user_profiles
                WHERE user_id = ? AND last_synced_at > ?
                "#,
            )
            .bind(user_id)
            .bind(&cutoff)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(
            |(user_id, display_name, avatar_url, profile_url, last_synced_at)| CachedProfile {
                user_id,
                display_name,
                avatar_url,
                profile_url,
                last_synced_at: decode_ts(&last_synced_at),
            },
        ))
    }
}
