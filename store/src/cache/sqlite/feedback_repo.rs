//! SQLite-backed store of user reactions to recommended games.
//!
//! One row per (user, game); the latest action overwrites. History is not
//! retained — the exclusion list only cares about the current state.

use chrono::Utc;
use sqlx::SqlitePool;

use super::helpers::{decode_action, decode_ts, encode_ts};
use crate::cache::models::{FeedbackAction, FeedbackEntry};
use crate::cache::traits::FeedbackRepository;
use crate::cache::StoreError;

/// SQLite implementation of [`FeedbackRepository`].
pub struct SqliteFeedbackRepository {
    pool: SqlitePool,
}

impl SqliteFeedbackRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl FeedbackRepository for SqliteFeedbackRepository {
    async fn record_feedback(
        &self,
        user_id: &str,
        app_id: i64,
        action: FeedbackAction,
    ) -> Result<(), StoreError> {
        let now = encode_ts(Utc::now());

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO rec_feedback (user_id, app_id, action, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(app_id)
        .bind(action.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn dismissed_app_ids(&self, user_id: &str) -> Result<Vec<i64>, StoreError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT app_id FROM rec_feedback WHERE user_id = ? AND action = ? ORDER BY app_id",
        )
        .bind(user_id)
        .bind(FeedbackAction::Dismissed.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn feedback_for_user(&self, user_id: &str) -> Result<Vec<FeedbackEntry>, StoreError> {
        let rows: Vec<(i64, String, String)> = sqlx::query_as(
            r#"
            SELECT app_id, action, created_at
            FROM rec_feedback
            WHERE user_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(app_id, action, created_at)| FeedbackEntry {
                app_id,
                action: decode_action(&action),
                created_at: decode_ts(&created_at),
            })
            .collect())
    }
}
