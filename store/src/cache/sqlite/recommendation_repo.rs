//! Append-only cache for AI-generated recommendation payloads.
//!
//! Writes always insert a new row; reads pick the newest row for the key
//! that has not expired. Appending instead of upserting keeps concurrent
//! regenerate requests from racing each other, and per-row expiries let
//! categories carry different TTLs without schema changes.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::helpers::{decode_kind, decode_ts, encode_ts};
use crate::cache::models::{CachedRecommendation, RecKind};
use crate::cache::traits::RecommendationRepository;
use crate::cache::StoreError;

/// SQLite implementation of [`RecommendationRepository`].
pub struct SqliteRecommendationRepository {
    pool: SqlitePool,
}

impl SqliteRecommendationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

type RecRow = (i64, String, Option<i64>, String, String, String, String);

fn row_to_cached(row: RecRow) -> CachedRecommendation {
    let (id, user_id, source_app_id, rec_type, payload, created_at, expires_at) = row;
    CachedRecommendation {
        id,
        user_id,
        source_app_id,
        kind: decode_kind(&rec_type),
        payload,
        created_at: decode_ts(&created_at),
        expires_at: decode_ts(&expires_at),
    }
}

impl RecommendationRepository for SqliteRecommendationRepository {
    async fn save_recommendation(
        &self,
        user_id: &str,
        source_app_id: Option<i64>,
        kind: RecKind,
        payload: &str,
        ttl_hours: i64,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let created_at = encode_ts(now);
        let expires_at = encode_ts(now + Duration::hours(ttl_hours));

        sqlx::query(
            r#"
            INSERT INTO recommendations
                (user_id, source_app_id, rec_type, payload, created_at, expires_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(source_app_id)
        .bind(kind.as_str())
        .bind(payload)
        .bind(&created_at)
        .bind(&expires_at)
        .execute(&self.pool)
        .await?;

        debug!(user_id, kind = kind.as_str(), ttl_hours, "recommendation cached");
        Ok(())
    }

    async fn load_recommendation(
        &self,
        user_id: &str,
        source_app_id: Option<i64>,
        kind: RecKind,
    ) -> Result<Option<CachedRecommendation>, StoreError> {
        let now = encode_ts(Utc::now());

        // A missing source must match only rows stored without one, so
        // general recommendations never collide with per-game results.
        let row: Option<RecRow> = match source_app_id {
            Some(source) => {
                sqlx::query_as(
                    r#"
                    SELECT id, user_id, source_app_id, rec_type, payload,
                           created_at, expires_at
                    FROM recommendations
                    WHERE user_id = ? AND rec_type = ? AND source_app_id = ?
                          AND expires_at > ?
                    ORDER BY created_at DESC
                    LIMIT 1
                    "#,
                )
                .bind(user_id)
                .bind(kind.as_str())
                .bind(source)
                .bind(&now)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT id, user_id, source_app_id, rec_type, payload,
                           created_at, expires_at
                    FROM recommendations
                    WHERE user_id = ? AND rec_type = ? AND source_app_id IS NULL
                          AND expires_at > ?
                    ORDER BY created_at DESC
                    LIMIT 1
                    "#,
                )
                .bind(user_id)
                .bind(kind.as_str())
                .bind(&now)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        Ok(row.map(row_to_cached))
    }

    async fn evict_expired(&self) -> Result<u64, StoreError> {
        let now = encode_ts(Utc::now());
        let result = sqlx::query("DELETE FROM recommendations WHERE expires_at <= ?")
            .bind(&now)
            .execute(&self.pool)
            .await?;

        let evicted = result.rows_affected();
        if evicted > 0 {
            info!(evicted, "expired recommendation rows evicted");
        }
        Ok(evicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::sqlite::Database;

    async fn test_db() -> (Database, SqliteRecommendationRepository) {
        let db = Database::new_in_memory().await.unwrap();
        let repo = SqliteRecommendationRepository::new(db.pool().clone());
        (db, repo)
    }

    /// Expire every row for a user by rewriting expires_at into the past.
    /// created_at moves with it to keep the schema's expiry check satisfied.
    async fn expire_all(pool: &SqlitePool, user_id: &str) {
        let expires = encode_ts(Utc::now() - Duration::hours(1));
        let created = encode_ts(Utc::now() - Duration::hours(2));
        sqlx::query(
            "UPDATE recommendations SET created_at = ?, expires_at = ? WHERE user_id = ?",
        )
        .bind(&created)
        .bind(&expires)
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let (_db, repo) = test_db().await;
        repo.save_recommendation("user_1", Some(620), RecKind::Similar, r#"{"games":[]}"#, 24)
            .await
            .unwrap();

        let rec = repo
            .load_recommendation("user_1", Some(620), RecKind::Similar)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rec.payload, r#"{"games":[]}"#);
        assert_eq!(rec.kind, RecKind::Similar);
        assert_eq!(rec.source_app_id, Some(620));
        assert!(rec.expires_at > rec.created_at);
    }

    #[tokio::test]
    async fn test_miss_for_unknown_key() {
        let (_db, repo) = test_db().await;
        let rec = repo
            .load_recommendation("user_1", None, RecKind::General)
            .await
            .unwrap();
        assert!(rec.is_none());
    }

    #[tokio::test]
    async fn test_null_source_does_not_match_specific_source() {
        let (_db, repo) = test_db().await;
        repo.save_recommendation("user_1", None, RecKind::General, "general-payload", 12)
            .await
            .unwrap();

        let rec = repo
            .load_recommendation("user_1", Some(5), RecKind::General)
            .await
            .unwrap();
        assert!(rec.is_none());
    }

    #[tokio::test]
    async fn test_specific_source_does_not_match_null_query() {
        let (_db, repo) = test_db().await;
        repo.save_recommendation("user_1", Some(5), RecKind::General, "sourced-payload", 12)
            .await
            .unwrap();

        let rec = repo
            .load_recommendation("user_1", None, RecKind::General)
            .await
            .unwrap();
        assert!(rec.is_none());
    }

    #[tokio::test]
    async fn test_kinds_are_isolated() {
        let (_db, repo) = test_db().await;
        repo.save_recommendation("user_1", None, RecKind::Library, "from-library", 12)
            .await
            .unwrap();

        let rec = repo
            .load_recommendation("user_1", None, RecKind::General)
            .await
            .unwrap();
        assert!(rec.is_none());
    }

    #[tokio::test]
    async fn test_expired_row_is_miss() {
        let (db, repo) = test_db().await;
        repo.save_recommendation("user_1", None, RecKind::General, "payload", 1)
            .await
            .unwrap();
        assert!(repo
            .load_recommendation("user_1", None, RecKind::General)
            .await
            .unwrap()
            .is_some());

        expire_all(db.pool(), "user_1").await;
        assert!(repo
            .load_recommendation("user_1", None, RecKind::General)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_newest_valid_row_wins() {
        let (db, repo) = test_db().await;
        repo.save_recommendation("user_1", None, RecKind::General, "old", 12)
            .await
            .unwrap();
        // Backdate the first row so the next insert is strictly newer.
        let created = encode_ts(Utc::now() - Duration::hours(3));
        sqlx::query("UPDATE recommendations SET created_at = ? WHERE payload = 'old'")
            .bind(&created)
            .execute(db.pool())
            .await
            .unwrap();
        repo.save_recommendation("user_1", None, RecKind::General, "new", 12)
            .await
            .unwrap();

        let rec = repo
            .load_recommendation("user_1", None, RecKind::General)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rec.payload, "new");

        // Both historical rows coexist; reads just skip past the older one.
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recommendations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 2);
    }

    #[tokio::test]
    async fn test_evict_expired() {
        let (db, repo) = test_db().await;
        repo.save_recommendation("user_1", None, RecKind::General, "stale", 1)
            .await
            .unwrap();
        repo.save_recommendation("user_2", Some(620), RecKind::Similar, "fresh", 24)
            .await
            .unwrap();
        expire_all(db.pool(), "user_1").await;

        let evicted = repo.evict_expired().await.unwrap();
        assert_eq!(evicted, 1);
        assert!(repo
            .load_recommendation("user_2", Some(620), RecKind::Similar)
            .await
            .unwrap()
            .is_some());

        // Nothing left to evict.
        assert_eq!(repo.evict_expired().await.unwrap(), 0);
    }
}
