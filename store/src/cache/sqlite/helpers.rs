//! Shared encode/decode helpers for SQLite ↔ domain type conversions.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with
//! microsecond precision so that string comparison in SQL matches
//! chronological order. Enum columns are `TEXT` under CHECK constraints;
//! the decode fallbacks are unreachable for rows the schema accepted.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::cache::models::{FeedbackAction, PlayStatus, RecKind};

/// Encode a timestamp for storage.
pub(crate) fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode a stored timestamp. Malformed values decode to the epoch, which
/// every freshness predicate treats as stale.
pub(crate) fn decode_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

pub(crate) fn decode_kind(s: &str) -> RecKind {
    RecKind::parse(s).unwrap_or(RecKind::General)
}

pub(crate) fn decode_action(s: &str) -> FeedbackAction {
    FeedbackAction::parse(s).unwrap_or(FeedbackAction::Clicked)
}

pub(crate) fn decode_status(s: &str) -> PlayStatus {
    PlayStatus::parse(s).unwrap_or(PlayStatus::Played)
}

/// JSON-encode a string list for a TEXT column.
pub(crate) fn encode_list(items: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(items)
}

/// Decode a JSON-encoded string list; NULL or garbage becomes empty.
pub(crate) fn decode_list(s: Option<&str>) -> Vec<String> {
    s.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ts_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(decode_ts(&encode_ts(ts)), ts);
    }

    #[test]
    fn ts_encoding_sorts_lexicographically() {
        let earlier = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let later = earlier + chrono::Duration::microseconds(1);
        let a = encode_ts(earlier);
        let b = encode_ts(later);
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[test]
    fn malformed_ts_decodes_stale() {
        assert_eq!(decode_ts("not-a-date"), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn list_roundtrip() {
        let devs = vec!["Valve".to_string(), "Hidden Path".to_string()];
        let encoded = encode_list(&devs).unwrap();
        assert_eq!(decode_list(Some(&encoded)), devs);
        assert!(decode_list(None).is_empty());
        assert!(decode_list(Some("{broken")).is_empty());
    }

    #[test]
    fn enum_decode_fallbacks() {
        assert_eq!(decode_kind("similar"), RecKind::Similar);
        assert_eq!(decode_kind("???"), RecKind::General);
        assert_eq!(decode_action("saved"), FeedbackAction::Saved);
        assert_eq!(decode_status("liked"), PlayStatus::Liked);
    }
}
