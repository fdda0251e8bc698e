//! SQLite-backed cache for catalog game metadata.
//!
//! Metadata is global, never user-scoped. The genre set — and the tag set
//! when one is supplied — is replaced wholesale in the same transaction as
//! the metadata write, so the relations always reflect the most recent
//! successful fetch.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use super::helpers::{decode_list, decode_ts, encode_list, encode_ts};
use crate::cache::models::{CachedGame, GameDetails, TagData};
use crate::cache::traits::MetadataRepository;
use crate::cache::StoreError;

/// How long fetched metadata stays fresh.
const METADATA_TTL_DAYS: i64 = 7;

/// Row type for metadata queries, mapped via `sqlx::FromRow`.
#[derive(sqlx::FromRow)]
struct MetadataRow {
    app_id: i64,
    name: String,
    kind: Option<String>,
    short_description: Option<String>,
    header_image: Option<String>,
    developers: Option<String>,
    publishers: Option<String>,
    critic_score: Option<i64>,
    release_date: Option<String>,
    price: Option<String>,
    last_fetched_at: String,
}

impl MetadataRow {
    fn into_cached(self, genres: Vec<String>, tags: Vec<TagData>) -> CachedGame {
        CachedGame {
            app_id: self.app_id,
            name: self.name,
            kind: self.kind,
            short_description: self.short_description,
            header_image: self.header_image,
            developers: decode_list(self.developers.as_deref()),
            publishers: decode_list(self.publishers.as_deref()),
            critic_score: self.critic_score,
            release_date: self.release_date,
            price: self.price,
            genres,
            tags,
            last_fetched_at: decode_ts(&self.last_fetched_at),
        }
    }
}

/// SQLite implementation of [`MetadataRepository`].
pub struct SqliteMetadataRepository {
    pool: SqlitePool,
}

impl SqliteMetadataRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl MetadataRepository for SqliteMetadataRepository {
    async fn save_game(
        &self,
        app_id: i64,
        details: &GameDetails,
        tags: Option<&[TagData]>,
    ) -> Result<(), StoreError> {
        let now = encode_ts(Utc::now());
        let developers = encode_list(&details.developers)?;
        let publishers = encode_list(&details.publishers)?;

        let mut tx = self.pool.begin().await?;

        let existing: Option<(String,)> =
            sqlx::query_as("SELECT name FROM game_metadata WHERE app_id = ?")
                .bind(app_id)
                .fetch_optional(&mut *tx)
                .await?;

        match existing {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO game_metadata
                        (app_id, name, kind, short_description, header_image,
                         developers, publishers, critic_score, release_date,
                         price, last_fetched_at)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(app_id)
                .bind(&details.name)
                .bind(&details.kind)
                .bind(&details.short_description)
                .bind(&details.header_image)
                .bind(&developers)
                .bind(&publishers)
                .bind(details.critic_score)
                .bind(&details.release_date)
                .bind(&details.price)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
            }
            Some((current,)) => {
                // First non-empty name wins until a later non-empty update.
                let name = if details.name.trim().is_empty() {
                    current
                } else {
                    details.name.clone()
                };
                sqlx::query(
                    r#"
                    UPDATE game_metadata
                    SET name = ?, kind = ?, short_description = ?,
                        header_image = ?, developers = ?, publishers = ?,
                        critic_score = ?, release_date = ?, price = ?,
                        last_fetched_at = ?
                    WHERE app_id = ?
                    "#,
                )
                .bind(&name)
                .bind(&details.kind)
                .bind(&details.short_description)
                .bind(&details.header_image)
                .bind(&developers)
                .bind(&publishers)
                .bind(details.critic_score)
                .bind(&details.release_date)
                .bind(&details.price)
                .bind(&now)
                .bind(app_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        sqlx::query("DELETE FROM game_genres WHERE app_id = ?")
            .bind(app_id)
            .execute(&mut *tx)
            .await?;
        for genre in &details.genres {
            sqlx::query("INSERT OR IGNORE INTO game_genres (app_id, genre) VALUES (?, ?)")
                .bind(app_id)
                .bind(genre)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(tags) = tags {
            sqlx::query("DELETE FROM game_tags WHERE app_id = ?")
                .bind(app_id)
                .execute(&mut *tx)
                .await?;
            for tag in tags {
                sqlx::query("INSERT OR IGNORE INTO game_tags (app_id, tag, rank) VALUES (?, ?, ?)")
                    .bind(app_id)
                    .bind(&tag.tag)
                    .bind(tag.rank)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn load_game(&self, app_id: i64) -> Result<Option<CachedGame>, StoreError> {
        let cutoff = encode_ts(Utc::now() - Duration::days(METADATA_TTL_DAYS));

        // Name-only stubs carry a NULL last_fetched_at and never pass this
        // predicate.
        let row: Option<MetadataRow> = sqlx::query_as(
            r#"
            SELECT app_id, name, kind, short_description, header_image,
                   developers, publishers, critic_score, release_date, price,
                   last_fetched_at
            FROM game_metadata
            WHERE app_id = ? AND last_fetched_at > ?
            "#,
        )
        .bind(app_id)
        .bind(&cutoff)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            None => Ok(None),
            Some(r) => {
                let genres: Vec<(String,)> =
                    sqlx::query_as("SELECT genre FROM game_genres WHERE app_id = ? ORDER BY genre")
                        .bind(app_id)
                        .fetch_all(&self.pool)
                        .await?;
                let tags = load_tags_for(&self.pool, app_id).await?;
                Ok(Some(
                    r.into_cached(genres.into_iter().map(|g| g.0).collect(), tags),
                ))
            }
        }
    }

    async fn load_tags(&self, app_id: i64) -> Result<Vec<TagData>, StoreError> {
        load_tags_for(&self.pool, app_id).await
    }

    async fn delete_game(&self, app_id: i64) -> Result<(), StoreError> {
        // Genre and tag rows cascade via their foreign keys.
        sqlx::query("DELETE FROM game_metadata WHERE app_id = ?")
            .bind(app_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Load all tags for a game ordered by ascending rank.
async fn load_tags_for(pool: &SqlitePool, app_id: i64) -> Result<Vec<TagData>, StoreError> {
    let rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT tag, rank FROM game_tags WHERE app_id = ? ORDER BY rank")
            .bind(app_id)
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|(tag, rank)| TagData { tag, rank })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::sqlite::Database;

    async fn test_db() -> (Database, SqliteMetadataRepository) {
        let db = Database::new_in_memory().await.unwrap();
        let repo = SqliteMetadataRepository::new(db.pool().clone());
        (db, repo)
    }

    fn sample_details(name: &str) -> GameDetails {
        GameDetails {
            name: name.to_string(),
            kind: Some("game".to_string()),
            short_description: Some("First-person puzzles.".to_string()),
            header_image: Some("https://cdn.example/620/header.jpg".to_string()),
            developers: vec!["Valve".to_string()],
            publishers: vec!["Valve".to_string()],
            critic_score: Some(95),
            release_date: Some("18 Apr, 2011".to_string()),
            price: Some("9,75€".to_string()),
            genres: vec!["Action".to_string(), "Adventure".to_string()],
        }
    }

    fn sample_tags() -> Vec<TagData> {
        vec![
            TagData { tag: "Roguelike".to_string(), rank: 2 },
            TagData { tag: "Indie".to_string(), rank: 1 },
        ]
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let (_db, repo) = test_db().await;
        repo.save_game(620, &sample_details("Portal 2"), Some(&sample_tags()))
            .await
            .unwrap();

        let game = repo.load_game(620).await.unwrap().unwrap();
        assert_eq!(game.name, "Portal 2");
        assert_eq!(game.developers, vec!["Valve"]);
        assert_eq!(game.critic_score, Some(95));
        assert_eq!(game.genres, vec!["Action", "Adventure"]);
    }

    #[tokio::test]
    async fn test_load_nonexistent() {
        let (_db, repo) = test_db().await;
        assert!(repo.load_game(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tags_come_back_rank_ordered() {
        let (_db, repo) = test_db().await;
        repo.save_game(620, &sample_details("Portal 2"), Some(&sample_tags()))
            .await
            .unwrap();

        let tags = repo.load_tags(620).await.unwrap();
        let names: Vec<&str> = tags.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(names, vec!["Indie", "Roguelike"]);
    }

    #[tokio::test]
    async fn test_empty_name_never_clobbers() {
        let (_db, repo) = test_db().await;
        repo.save_game(70, &sample_details("Half-Life"), None)
            .await
            .unwrap();

        let mut refetched = sample_details("");
        refetched.critic_score = Some(96);
        repo.save_game(70, &refetched, None).await.unwrap();

        let game = repo.load_game(70).await.unwrap().unwrap();
        assert_eq!(game.name, "Half-Life");
        // Everything else still updates.
        assert_eq!(game.critic_score, Some(96));
    }

    #[tokio::test]
    async fn test_nonempty_name_updates() {
        let (_db, repo) = test_db().await;
        repo.save_game(70, &sample_details("Half-Life"), None)
            .await
            .unwrap();
        repo.save_game(70, &sample_details("Half-Life 2"), None)
            .await
            .unwrap();

        let game = repo.load_game(70).await.unwrap().unwrap();
        assert_eq!(game.name, "Half-Life 2");
    }

    #[tokio::test]
    async fn test_stale_metadata_is_miss() {
        let (db, repo) = test_db().await;
        repo.save_game(620, &sample_details("Portal 2"), None)
            .await
            .unwrap();

        let ts = encode_ts(Utc::now() - Duration::days(8));
        sqlx::query("UPDATE game_metadata SET last_fetched_at = ? WHERE app_id = 620")
            .bind(&ts)
            .execute(db.pool())
            .await
            .unwrap();

        assert!(repo.load_game(620).await.unwrap().is_none());
        // Tags are still reachable without a freshness predicate.
        repo.save_game(620, &sample_details("Portal 2"), Some(&sample_tags()))
            .await
            .unwrap();
        assert_eq!(repo.load_tags(620).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stub_is_never_fresh() {
        let (db, repo) = test_db().await;
        sqlx::query("INSERT INTO game_metadata (app_id, name) VALUES (620, 'Portal 2')")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(repo.load_game(620).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_genre_replace_prunes_removed_set_members() {
        let (_db, repo) = test_db().await;
        repo.save_game(620, &sample_details("Portal 2"), None)
            .await
            .unwrap();

        let mut refetched = sample_details("Portal 2");
        refetched.genres = vec!["Puzzle".to_string()];
        repo.save_game(620, &refetched, None).await.unwrap();

        let game = repo.load_game(620).await.unwrap().unwrap();
        assert_eq!(game.genres, vec!["Puzzle"]);
    }

    #[tokio::test]
    async fn test_omitted_tags_leave_existing_set() {
        let (_db, repo) = test_db().await;
        repo.save_game(620, &sample_details("Portal 2"), Some(&sample_tags()))
            .await
            .unwrap();
        // A refresh without tag data must not wipe the tag set.
        repo.save_game(620, &sample_details("Portal 2"), None)
            .await
            .unwrap();

        assert_eq!(repo.load_tags(620).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_cascades_genres_and_tags() {
        let (db, repo) = test_db().await;
        repo.save_game(620, &sample_details("Portal 2"), Some(&sample_tags()))
            .await
            .unwrap();

        repo.delete_game(620).await.unwrap();

        let genres: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM game_genres WHERE app_id = 620")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let tags: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM game_tags WHERE app_id = 620")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(genres.0, 0);
        assert_eq!(tags.0, 0);
    }
}
