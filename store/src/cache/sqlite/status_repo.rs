//! SQLite-backed store of user-assigned game statuses.
//!
//! Statuses feed two consumers: the recommendation collaborator reads the
//! `not_interested` set (plus dismissals from the feedback store) as an
//! exclusion list, and the prompt builder gets the grouped summary.

use chrono::Utc;
use sqlx::SqlitePool;

use super::helpers::{decode_status, decode_ts, encode_ts};
use crate::cache::models::{GameRef, PlayStatus, StatusEntry, StatusSummary};
use crate::cache::traits::StatusRepository;
use crate::cache::StoreError;

/// SQLite implementation of [`StatusRepository`].
pub struct SqliteStatusRepository {
    pool: SqlitePool,
}

impl SqliteStatusRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn rows_to_entries(rows: Vec<(i64, String, String, String)>) -> Vec<StatusEntry> {
    rows.into_iter()
        .map(|(app_id, name, status, updated_at)| StatusEntry {
            app_id,
            name,
            status: decode_status(&status),
            updated_at: decode_ts(&updated_at),
        })
        .collect()
}

impl StatusRepository for SqliteStatusRepository {
    async fn set_status(
        &self,
        user_id: &str,
        app_id: i64,
        name: &str,
        status: PlayStatus,
    ) -> Result<(), StoreError> {
        let now = encode_ts(Utc::now());

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO game_statuses (user_id, app_id, name, status, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(app_id)
        .bind(name)
        .bind(status.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_status(&self, user_id: &str, app_id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM game_statuses WHERE user_id = ? AND app_id = ?")
            .bind(user_id)
            .bind(app_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn statuses_for_user(&self, user_id: &str) -> Result<Vec<StatusEntry>, StoreError> {
        let rows: Vec<(i64, String, String, String)> = sqlx::query_as(
            r#"
            SELECT app_id, name, status, updated_at
            FROM game_statuses
            WHERE user_id = ?
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows_to_entries(rows))
    }

    async fn by_status(
        &self,
        user_id: &str,
        status: PlayStatus,
    ) -> Result<Vec<StatusEntry>, StoreError> {
        let rows: Vec<(i64, String, String, String)> = sqlx::query_as(
            r#"
            SELECT app_id, name, status, updated_at
            FROM game_statuses
            WHERE user_id = ? AND status = ?
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows_to_entries(rows))
    }

    async fn summarize_for_prompt(&self, user_id: &str) -> Result<StatusSummary, StoreError> {
        let mut summary = StatusSummary::default();

        for entry in self.statuses_for_user(user_id).await? {
            let game = GameRef {
                app_id: entry.app_id,
                name: entry.name,
            };
            match entry.status {
                PlayStatus::Played => summary.played.push(game),
                PlayStatus::Liked => summary.liked.push(game),
                PlayStatus::NotInterested => summary.not_interested.push(game),
            }
        }

        Ok(summary)
    }
}
