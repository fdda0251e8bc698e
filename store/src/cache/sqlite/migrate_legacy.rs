//! One-time import of the legacy flat-file status store.
//!
//! Early builds kept statuses in `statuses.json` under the data directory.
//! The import loads every valid record into `game_statuses` inside one
//! transaction, then renames the file to `.bak` so it is consumed exactly
//! once while staying around for inspection. A file that fails to parse
//! outright is logged and left untouched — a corrupt artifact must never
//! block startup.

use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::{SqlitePool, Transaction};
use tracing::{info, warn};

use super::helpers::encode_ts;
use crate::cache::legacy::{self, LegacyStatus};
use crate::cache::StoreError;

/// Outcome of a legacy migration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// No legacy file was found (or it was unreadable/corrupt and skipped).
    pub skipped: bool,
    /// Records loaded into the status table.
    pub imported: u64,
    /// Records dropped by validation.
    pub discarded: u64,
}

impl MigrationReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            imported: 0,
            discarded: 0,
        }
    }
}

/// Import the legacy status file under `data_dir`, if one exists.
///
/// Storage errors propagate; everything wrong with the file itself is
/// tolerated and reported via the returned counts.
pub async fn migrate_legacy_statuses(
    pool: &SqlitePool,
    data_dir: &Path,
) -> Result<MigrationReport, StoreError> {
    let path = data_dir.join(legacy::LEGACY_FILE);
    if !path.exists() {
        return Ok(MigrationReport::skipped());
    }

    info!(path = %path.display(), "importing legacy status file");

    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "legacy status file unreadable, leaving it in place");
            return Ok(MigrationReport::skipped());
        }
    };

    let raw: legacy::LegacyStatusFile = match serde_json::from_str(&contents) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "legacy status file failed to parse, leaving it in place");
            return Ok(MigrationReport::skipped());
        }
    };

    let (records, discarded) = legacy::validate(raw);

    let mut tx = pool.begin().await?;
    insert_statuses(&mut tx, &records).await?;
    tx.commit().await?;

    // Renaming marks the file consumed; the content stays inspectable.
    let backup = path.with_extension("json.bak");
    std::fs::rename(&path, &backup)?;

    let report = MigrationReport {
        skipped: false,
        imported: records.len() as u64,
        discarded,
    };

    info!(
        imported = report.imported,
        discarded = report.discarded,
        backup = %backup.display(),
        "legacy status migration completed"
    );

    Ok(report)
}

async fn insert_statuses(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    records: &[LegacyStatus],
) -> Result<(), StoreError> {
    for record in records {
        let updated_at = record
            .updated_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| encode_ts(d.with_timezone(&Utc)))
            .unwrap_or_else(|| encode_ts(Utc::now()));

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO game_statuses (user_id, app_id, name, status, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.user_id)
        .bind(record.app_id)
        .bind(&record.name)
        .bind(record.status.as_str())
        .bind(&updated_at)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
