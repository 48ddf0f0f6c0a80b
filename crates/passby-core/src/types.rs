//! Domain types shared between the store and the HTTP layer

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// One user's current ranging handshake token within one room
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenEntry {
    /// Client-supplied identifier, unique within a room (last write wins)
    pub user_id: String,
    /// Human-readable label, defaults to `user_id`
    pub display_name: String,
    /// Opaque Base64 blob
    pub token: String,
    /// Visibility boundary
    pub room: String,
    /// Time of the last registration
    pub created_at: DateTime<Utc>,
    /// `created_at + ttl`
    pub expires_at: DateTime<Utc>,
}

impl TokenEntry {
    /// Build a fresh entry registered at `now`
    pub fn new(
        user_id: impl Into<String>,
        display_name: Option<String>,
        token: impl Into<String>,
        room: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let user_id = user_id.into();
        let display_name = display_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| user_id.clone());

        Self {
            user_id,
            display_name,
            token: token.into(),
            room: room.into(),
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Whether the entry has expired as of `now`.
    /// An entry is still live at exactly `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// A room with at least one live entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomSummary {
    pub name: String,
    pub user_count: usize,
}

/// Store-wide counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub total_tokens: usize,
    pub room_count: usize,
}

/// Format a timestamp as ISO-8601 UTC with millisecond precision,
/// e.g. `2026-10-17T12:30:00.000Z`
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, h, m, s).unwrap()
    }

    fn alice(display_name: Option<String>) -> TokenEntry {
        TokenEntry::new(
            "alice",
            display_name,
            "QQ==",
            "demo",
            at(12, 0, 0),
            Duration::minutes(30),
        )
    }

    #[test]
    fn test_display_name_defaults_to_user_id() {
        assert_eq!(alice(None).display_name, "alice");
        assert_eq!(alice(Some(String::new())).display_name, "alice");
        assert_eq!(alice(Some("Alice".into())).display_name, "Alice");
    }

    #[test]
    fn test_expiry_boundary() {
        let entry = TokenEntry::new("a", None, "QQ==", "demo", at(12, 0, 0), Duration::minutes(30));
        assert_eq!(entry.expires_at, at(12, 30, 0));

        assert!(!entry.is_expired_at(at(12, 29, 0)));
        assert!(!entry.is_expired_at(at(12, 30, 0)));
        assert!(entry.is_expired_at(at(12, 31, 0)));
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(at(12, 30, 0)), "2026-10-17T12:30:00.000Z");
    }
}
