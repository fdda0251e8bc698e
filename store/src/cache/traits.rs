//! Async repository trait definitions for the cache store.
//!
//! Each trait abstracts one aggregate of the store; route handlers consume
//! these rather than the concrete SQLite types, which keeps the handler
//! contract at "plain identifiers in, plain records or `None` out".
//!
//! Methods return `impl Future + Send` rather than using `async fn` so that
//! the futures are guaranteed `Send` — required once handlers run under
//! `tokio::spawn`.

use std::future::Future;

use super::models::{
    CachedGame, CachedOwnedGame, CachedProfile, CachedRecommendation, FeedbackAction,
    FeedbackEntry, GameDetails, OwnedGameData, PlayStatus, ProfileData, RecKind, StatusEntry,
    StatusSummary, TagData,
};
use super::StoreError;

/// Cache of user profiles fetched from the identity provider.
///
/// Writes always refresh the sync timestamp; reads treat a row older than
/// the profile freshness window as a miss even though it still exists.
pub trait ProfileRepository: Send + Sync {
    fn save_profile(
        &self,
        user_id: &str,
        data: &ProfileData,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
    fn load_profile(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<CachedProfile>, StoreError>> + Send;
}

/// Cache of per-user ownership/playtime snapshots.
///
/// Implementations must replace the whole snapshot atomically: a reader
/// sees either the previous complete library or the new one, never a mix.
pub trait LibraryRepository: Send + Sync {
    fn save_library(
        &self,
        user_id: &str,
        games: &[OwnedGameData],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
    fn load_library(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<Vec<CachedOwnedGame>>, StoreError>> + Send;
    /// Drop the user's profile and library rows to force a full resync.
    /// Global metadata and recommendation/feedback/status history stay.
    fn invalidate_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Cache of global (not user-scoped) game metadata with genre/tag sets.
///
/// Genre and tag sets are replaced wholesale in the same transaction as the
/// metadata write, so they are always consistent with it.
pub trait MetadataRepository: Send + Sync {
    fn save_game(
        &self,
        app_id: i64,
        details: &GameDetails,
        tags: Option<&[TagData]>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
    fn load_game(
        &self,
        app_id: i64,
    ) -> impl Future<Output = Result<Option<CachedGame>, StoreError>> + Send;
    /// Rank-ordered tags, with no freshness predicate.
    fn load_tags(
        &self,
        app_id: i64,
    ) -> impl Future<Output = Result<Vec<TagData>, StoreError>> + Send;
    fn delete_game(&self, app_id: i64) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Append-only cache of generated recommendation payloads.
pub trait RecommendationRepository: Send + Sync {
    fn save_recommendation(
        &self,
        user_id: &str,
        source_app_id: Option<i64>,
        kind: RecKind,
        payload: &str,
        ttl_hours: i64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
    /// Newest non-expired row for the exact key. A `None` source matches
    /// only rows stored without a source.
    fn load_recommendation(
        &self,
        user_id: &str,
        source_app_id: Option<i64>,
        kind: RecKind,
    ) -> impl Future<Output = Result<Option<CachedRecommendation>, StoreError>> + Send;
    /// Delete rows past their expiry; returns how many went. Maintenance
    /// only — reads never depend on eviction having run.
    fn evict_expired(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

/// Store of user reactions to recommended games.
pub trait FeedbackRepository: Send + Sync {
    fn record_feedback(
        &self,
        user_id: &str,
        app_id: i64,
        action: FeedbackAction,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
    fn dismissed_app_ids(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<i64>, StoreError>> + Send;
    fn feedback_for_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<FeedbackEntry>, StoreError>> + Send;
}

/// Store of user-assigned shelf statuses.
pub trait StatusRepository: Send + Sync {
    fn set_status(
        &self,
        user_id: &str,
        app_id: i64,
        name: &str,
        status: PlayStatus,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
    fn remove_status(
        &self,
        user_id: &str,
        app_id: i64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
    fn statuses_for_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<StatusEntry>, StoreError>> + Send;
    fn by_status(
        &self,
        user_id: &str,
        status: PlayStatus,
    ) -> impl Future<Output = Result<Vec<StatusEntry>, StoreError>> + Send;
    /// Group all of a user's statuses into the three prompt lists. Pure
    /// projection; no filtering of its own.
    fn summarize_for_prompt(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<StatusSummary, StoreError>> + Send;
}
