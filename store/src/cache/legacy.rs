//! Defensive parsing of the legacy flat-file status store.
//!
//! Early GameScout builds kept game statuses in a single JSON file: a map
//! of user id to a map of app id to status record. The file is treated as
//! an external, loosely-typed document — records are validated one at a
//! time and malformed ones discarded, so one bad entry never sinks the
//! whole import.

use std::collections::HashMap;

use serde::Deserialize;

use super::models::PlayStatus;

/// Filename of the legacy artifact under the data directory.
pub const LEGACY_FILE: &str = "statuses.json";

/// Per-game record as it appears in the legacy file. Every field is
/// optional at parse time; validation decides what survives.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStatusRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// The legacy file shape: user id -> app id -> record.
pub type LegacyStatusFile = HashMap<String, HashMap<String, RawStatusRecord>>;

/// A validated record ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyStatus {
    pub user_id: String,
    pub app_id: i64,
    pub name: String,
    pub status: PlayStatus,
    /// Raw timestamp string, normalized at insert time.
    pub updated_at: Option<String>,
}

/// Sift the raw map into insertable records, counting discards.
///
/// A record is discarded when its app id is not numeric, its name is
/// missing or blank, or its status is not one of the known values.
pub fn validate(file: LegacyStatusFile) -> (Vec<LegacyStatus>, u64) {
    let mut valid = Vec::new();
    let mut discarded = 0u64;

    for (user_id, games) in file {
        for (app_key, raw) in games {
            let Ok(app_id) = app_key.parse::<i64>() else {
                discarded += 1;
                continue;
            };
            let Some(name) = raw.name.filter(|n| !n.trim().is_empty()) else {
                discarded += 1;
                continue;
            };
            let Some(status) = raw.status.as_deref().and_then(PlayStatus::parse) else {
                discarded += 1;
                continue;
            };
            valid.push(LegacyStatus {
                user_id: user_id.clone(),
                app_id,
                name,
                status,
                updated_at: raw.updated_at,
            });
        }
    }

    (valid, discarded)
}
