//! Collaborator-facing record types for the cache store.
//!
//! Types suffixed `Data` are inputs written by the sync collaborators;
//! `Cached*` types are what reads hand back, timestamps included. Enum
//! columns round-trip through `as_str`/`parse` and are guarded by CHECK
//! constraints in the schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile fields delivered by the identity provider sync.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileData {
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub profile_url: Option<String>,
}

/// A cached profile row. Reads return it only while fresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedProfile {
    pub user_id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub profile_url: Option<String>,
    pub last_synced_at: DateTime<Utc>,
}

/// One owned game in a library sync payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnedGameData {
    pub app_id: i64,
    pub name: String,
    /// Total playtime in minutes.
    pub playtime_forever: i64,
    /// Playtime in the trailing two weeks, in minutes.
    pub playtime_recent: i64,
    /// Epoch seconds of the last session, when the catalog reports one.
    pub last_played_at: Option<i64>,
}

/// A library row as stored, with the display name joined back in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedOwnedGame {
    pub app_id: i64,
    pub name: String,
    pub playtime_forever: i64,
    pub playtime_recent: i64,
    pub last_played_at: Option<i64>,
    pub synced_at: DateTime<Utc>,
}

/// Catalog metadata for a game as delivered by the storefront collaborator.
///
/// An empty `name` never overwrites a non-empty stored name; the first
/// non-empty write wins until a later write supplies a real replacement.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GameDetails {
    pub name: String,
    pub kind: Option<String>,
    pub short_description: Option<String>,
    pub header_image: Option<String>,
    pub developers: Vec<String>,
    pub publishers: Vec<String>,
    pub critic_score: Option<i64>,
    pub release_date: Option<String>,
    pub price: Option<String>,
    pub genres: Vec<String>,
}

/// A ranked store tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagData {
    pub tag: String,
    pub rank: i64,
}

/// A cached metadata row with its genre and tag sets joined in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedGame {
    pub app_id: i64,
    pub name: String,
    pub kind: Option<String>,
    pub short_description: Option<String>,
    pub header_image: Option<String>,
    pub developers: Vec<String>,
    pub publishers: Vec<String>,
    pub critic_score: Option<i64>,
    pub release_date: Option<String>,
    pub price: Option<String>,
    pub genres: Vec<String>,
    /// Ordered by ascending rank.
    pub tags: Vec<TagData>,
    pub last_fetched_at: DateTime<Utc>,
}

/// Recommendation category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecKind {
    /// "More like this game" — keyed by a source game.
    Similar,
    /// Generated from the user's whole library.
    Library,
    /// General suggestions with no source game.
    General,
}

impl RecKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecKind::Similar => "similar",
            RecKind::Library => "library",
            RecKind::General => "general",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "similar" => Some(RecKind::Similar),
            "library" => Some(RecKind::Library),
            "general" => Some(RecKind::General),
            _ => None,
        }
    }
}

/// A cached recommendation entry retrieved from the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedRecommendation {
    pub id: i64,
    pub user_id: String,
    pub source_app_id: Option<i64>,
    pub kind: RecKind,
    /// Opaque serialized model output; (de)serialization belongs to the
    /// calling layer.
    pub payload: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// What a user did with a recommended game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAction {
    Saved,
    Dismissed,
    Clicked,
}

impl FeedbackAction {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackAction::Saved => "saved",
            FeedbackAction::Dismissed => "dismissed",
            FeedbackAction::Clicked => "clicked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "saved" => Some(FeedbackAction::Saved),
            "dismissed" => Some(FeedbackAction::Dismissed),
            "clicked" => Some(FeedbackAction::Clicked),
            _ => None,
        }
    }
}

/// Latest recorded feedback for one (user, game) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackEntry {
    pub app_id: i64,
    pub action: FeedbackAction,
    pub created_at: DateTime<Utc>,
}

/// User-assigned shelf status for a game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayStatus {
    Played,
    Liked,
    NotInterested,
}

impl PlayStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayStatus::Played => "played",
            PlayStatus::Liked => "liked",
            PlayStatus::NotInterested => "not_interested",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "played" => Some(PlayStatus::Played),
            "liked" => Some(PlayStatus::Liked),
            "not_interested" => Some(PlayStatus::NotInterested),
            _ => None,
        }
    }
}

/// One status row, scoped to a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusEntry {
    pub app_id: i64,
    pub name: String,
    pub status: PlayStatus,
    pub updated_at: DateTime<Utc>,
}

/// Minimal reference used in prompt summaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameRef {
    pub app_id: i64,
    pub name: String,
}

/// Status entries grouped for the prompt-building collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusSummary {
    pub played: Vec<GameRef>,
    pub liked: Vec<GameRef>,
    pub not_interested: Vec<GameRef>,
}
