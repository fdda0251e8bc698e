//! SQLite-backed cache for per-user game libraries.
//!
//! A library sync replaces the user's whole snapshot: delete-all then
//! insert, inside one transaction, so removed or delisted games never
//! linger and readers never observe a half-written mix of old and new rows.

use chrono::{Duration, Utc};
use sqlx::{SqlitePool, Transaction};
use tracing::{debug, info};

use super::helpers::{decode_ts, encode_ts};
use crate::cache::models::{CachedOwnedGame, OwnedGameData};
use crate::cache::traits::LibraryRepository;
use crate::cache::StoreError;

/// How long a library snapshot stays fresh.
const LIBRARY_TTL_MINUTES: i64 = 5;

/// SQLite implementation of [`LibraryRepository`].
pub struct SqliteLibraryRepository {
    pool: SqlitePool,
}

impl SqliteLibraryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl LibraryRepository for SqliteLibraryRepository {
    async fn save_library(&self, user_id: &str, games: &[OwnedGameData]) -> Result<(), StoreError> {
        // One shared synced_at: the snapshot is uniform by construction.
        let now = encode_ts(Utc::now());

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_games WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for game in games {
            sqlx::query(
                r#"
                INSERT INTO user_games
                    (user_id, app_id, playtime_forever, playtime_recent,
                     last_played_at, synced_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(user_id)
            .bind(game.app_id)
            .bind(game.playtime_forever)
            .bind(game.playtime_recent)
            .bind(game.last_played_at)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

            ensure_metadata_stub(&mut tx, game.app_id, &game.name).await?;
        }

        tx.commit().await?;

        debug!(user_id, games = games.len(), "library snapshot replaced");
        Ok(())
    }

    async fn load_library(
        &self,
        user_id: &str,
    ) -> Result<Option<Vec<CachedOwnedGame>>, StoreError> {
        let cutoff = encode_ts(Utc::now() - Duration::minutes(LIBRARY_TTL_MINUTES));

        // Snapshot freshness is read off the rows themselves: save_library
        // stamps every row with one synced_at, so the newest row speaks for
        // the whole snapshot.
        let newest: (Option<String>,) =
            sqlx::query_as("SELECT MAX(synced_at) FROM user_games WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        match newest.0 {
            Some(ts) if ts > cutoff => {}
            _ => return Ok(None),
        }

        let rows: Vec<(i64, i64, i64, Option<i64>, String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT g.app_id, g.playtime_forever, g.playtime_recent,
                   g.last_played_at, g.synced_at, m.name
            FROM user_games g
            LEFT JOIN game_metadata m ON m.app_id = g.app_id
            WHERE g.user_id = ?
            ORDER BY g.playtime_forever DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let games = rows
            .into_iter()
            .map(
                |(app_id, playtime_forever, playtime_recent, last_played_at, synced_at, name)| {
                    CachedOwnedGame {
                        app_id,
                        name: name.unwrap_or_default(),
                        playtime_forever,
                        playtime_recent,
                        last_played_at,
                        synced_at: decode_ts(&synced_at),
                    }
                },
            )
            .collect();

        Ok(Some(games))
    }

    async fn invalidate_user(&self, user_id: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_games WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM user_profiles WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(user_id, "user cache invalidated");
        Ok(())
    }
}

/// Make sure a name-only metadata row exists for `app_id`.
///
/// The stub keeps last_fetched_at NULL so it never satisfies the metadata
/// freshness read. Name protection applies: a non-empty stored name is
/// never overwritten, and a blank one is repaired when the sync has a
/// better name.
async fn ensure_metadata_stub(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    app_id: i64,
    name: &str,
) -> Result<(), StoreError> {
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT name FROM game_metadata WHERE app_id = ?")
            .bind(app_id)
            .fetch_optional(&mut **tx)
            .await?;

    match existing {
        None => {
            sqlx::query("INSERT INTO game_metadata (app_id, name) VALUES (?, ?)")
                .bind(app_id)
                .bind(name)
                .execute(&mut **tx)
                .await?;
        }
        Some((current,)) if current.trim().is_empty() && !name.trim().is_empty() => {
            sqlx::query("UPDATE game_metadata SET name = ? WHERE app_id = ?")
                .bind(name)
                .bind(app_id)
                .execute(&mut **tx)
                .await?;
        }
        Some(_) => {}
    }

    Ok(())
}
