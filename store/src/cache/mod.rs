//! The cache subsystem: an embedded SQLite store that memoizes upstream
//! entities under per-entity freshness windows.
//!
//! Collaborators never talk to the pool directly; they obtain a repository
//! from [`Store`] and call the operations defined in [`traits`]. A cache
//! miss — including a row that exists but has aged out of its freshness
//! window — is `Ok(None)`, never an error.

mod legacy;
mod models;
pub mod sqlite;
pub mod traits;

pub use models::{
    CachedGame, CachedOwnedGame, CachedProfile, CachedRecommendation, FeedbackAction,
    FeedbackEntry, GameDetails, GameRef, OwnedGameData, PlayStatus, ProfileData, RecKind,
    StatusEntry, StatusSummary, TagData,
};
pub use sqlite::{
    migrate_legacy_statuses, Database, MigrationReport, SqliteFeedbackRepository,
    SqliteLibraryRepository, SqliteMetadataRepository, SqliteProfileRepository,
    SqliteRecommendationRepository, SqliteStatusRepository,
};

use std::path::{Path, PathBuf};

use tokio::sync::OnceCell;

/// Filename of the SQLite store under the data directory.
pub const DB_FILE: &str = "cache.db";

/// Errors from the cache store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(String),
}

/// Process-wide handle to the cache store.
///
/// Construction is cheap and infallible; the underlying [`Database`] is
/// opened lazily on first use so the data directory stays configurable up
/// to that point. The handle is intended to be created once, wrapped in an
/// `Arc` by the host application, and passed to collaborators explicitly —
/// it is not a global.
///
/// The legacy status-file import runs at most once per handle, before the
/// first [`SqliteStatusRepository`] is handed out.
pub struct Store {
    data_dir: PathBuf,
    database: OnceCell<Database>,
    legacy_migration: OnceCell<MigrationReport>,
}

impl Store {
    /// Create a handle rooted at `data_dir`. Nothing is opened yet.
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            database: OnceCell::new(),
            legacy_migration: OnceCell::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The lazily-opened database. The first caller pays for directory
    /// creation, file open and migrations; failure here is fatal and is
    /// retried on the next call rather than cached.
    pub async fn database(&self) -> Result<&Database, StoreError> {
        self.database
            .get_or_try_init(|| async {
                let path = self.data_dir.join(DB_FILE);
                Database::open(&path).await
            })
            .await
    }

    /// Run the legacy status-file import if it has not run yet and return
    /// its report. Parse problems in the legacy file are swallowed by the
    /// migration itself; only storage errors surface here, and those leave
    /// the once-cell unset so the import is retried.
    pub async fn ensure_status_migration(&self) -> Result<&MigrationReport, StoreError> {
        let db = self.database().await?;
        self.legacy_migration
            .get_or_try_init(|| migrate_legacy_statuses(db.pool(), &self.data_dir))
            .await
    }

    pub async fn profiles(&self) -> Result<SqliteProfileRepository, StoreError> {
        let db = self.database().await?;
        Ok(SqliteProfileRepository::new(db.pool().clone()))
    }

    pub async fn library(&self) -> Result<SqliteLibraryRepository, StoreError> {
        let db = self.database().await?;
        Ok(SqliteLibraryRepository::new(db.pool().clone()))
    }

    pub async fn games(&self) -> Result<SqliteMetadataRepository, StoreError> {
        let db = self.database().await?;
        Ok(SqliteMetadataRepository::new(db.pool().clone()))
    }

    pub async fn recommendations(&self) -> Result<SqliteRecommendationRepository, StoreError> {
        let db = self.database().await?;
        Ok(SqliteRecommendationRepository::new(db.pool().clone()))
    }

    pub async fn feedback(&self) -> Result<SqliteFeedbackRepository, StoreError> {
        let db = self.database().await?;
        Ok(SqliteFeedbackRepository::new(db.pool().clone()))
    }

    /// Status repository. Gated on the legacy import so no status accessor
    /// ever runs before the old flat file has been consumed.
    pub async fn statuses(&self) -> Result<SqliteStatusRepository, StoreError> {
        self.ensure_status_migration().await?;
        let db = self.database().await?;
        Ok(SqliteStatusRepository::new(db.pool().clone()))
    }
}
