//! JSON wire messages for the relay API
//!
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use passby_core::{format_timestamp, ErrorCode, RoomSummary, TokenEntry};

/// Body of `POST /ni/token` and `POST /ni/token/refresh`.
///
/// Every field is optional at the parsing stage so that a missing field is
/// reported as a validation error rather than a parse failure.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_id: Option<String>,
    pub display_name: Option<String>,
    pub token: Option<String>,
    pub room: Option<String>,
}

/// Query of `GET /ni/token`
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListTokensQuery {
    pub room: Option<String>,
    pub exclude_user_id: Option<String>,
}

/// Query of `DELETE /ni/token`
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UnregisterQuery {
    pub user_id: Option<String>,
    pub room: Option<String>,
}

/// `GET /`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub name: String,
    pub version: String,
    pub status: String,
}

/// `GET /stats`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_tokens: usize,
    pub room_count: usize,
    /// Seconds since the server started
    pub uptime: u64,
}

/// `POST /ni/token`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub user_id: String,
    pub room: String,
    pub expires_at: String,
}

impl From<&TokenEntry> for RegisterResponse {
    fn from(entry: &TokenEntry) -> Self {
        Self {
            success: true,
            user_id: entry.user_id.clone(),
            room: entry.room.clone(),
            expires_at: format_timestamp(entry.expires_at),
        }
    }
}

/// `POST /ni/token/refresh`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub expires_at: String,
}

impl From<&TokenEntry> for RefreshResponse {
    fn from(entry: &TokenEntry) -> Self {
        Self {
            success: true,
            expires_at: format_timestamp(entry.expires_at),
        }
    }
}

/// One peer token as seen by another device
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenView {
    pub user_id: String,
    pub display_name: String,
    pub token: String,
}

impl From<TokenEntry> for TokenView {
    fn from(entry: TokenEntry) -> Self {
        Self {
            user_id: entry.user_id,
            display_name: entry.display_name,
            token: entry.token,
        }
    }
}

/// `GET /ni/token`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenListResponse {
    pub tokens: Vec<TokenView>,
}

/// `DELETE /ni/token`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnregisterResponse {
    pub success: bool,
    pub deleted: bool,
}

/// One active room
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub name: String,
    pub user_count: usize,
}

impl From<RoomSummary> for RoomView {
    fn from(room: RoomSummary) -> Self {
        Self {
            name: room.name,
            user_count: room.user_count,
        }
    }
}

/// `GET /ni/rooms`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomListResponse {
    pub rooms: Vec<RoomView>,
}

/// `DELETE /ni/rooms/:name`
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearRoomResponse {
    pub success: bool,
    pub deleted_tokens: usize,
}

/// Body of every error response
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorCode,
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_register_request_camel_case() {
        let req: RegisterRequest = serde_json::from_value(json!({
            "userId": "a",
            "displayName": "Alice",
            "token": "QQ==",
            "room": "demo"
        }))
        .unwrap();

        assert_eq!(req.user_id.as_deref(), Some("a"));
        assert_eq!(req.display_name.as_deref(), Some("Alice"));
        assert_eq!(req.token.as_deref(), Some("QQ=="));
        assert_eq!(req.room.as_deref(), Some("demo"));
    }

    #[test]
    fn test_register_request_missing_fields() {
        let req: RegisterRequest = serde_json::from_value(json!({ "userId": "a" })).unwrap();
        assert!(req.room.is_none());
        assert!(req.token.is_none());
    }

    #[test]
    fn test_register_response_shape() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        let entry = TokenEntry::new("a", None, "QQ==", "demo", now, Duration::minutes(30));

        let value = serde_json::to_value(RegisterResponse::from(&entry)).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "userId": "a",
                "room": "demo",
                "expiresAt": "2026-10-17T12:30:00.000Z"
            })
        );

        let value = serde_json::to_value(RefreshResponse::from(&entry)).unwrap();
        assert_eq!(
            value,
            json!({ "success": true, "expiresAt": "2026-10-17T12:30:00.000Z" })
        );
    }

    #[test]
    fn test_list_shapes() {
        let tokens = TokenListResponse {
            tokens: vec![TokenView {
                user_id: "b".into(),
                display_name: "b".into(),
                token: "Qg==".into(),
            }],
        };
        assert_eq!(
            serde_json::to_value(tokens).unwrap(),
            json!({ "tokens": [{ "userId": "b", "displayName": "b", "token": "Qg==" }] })
        );

        let rooms = RoomListResponse {
            rooms: vec![RoomView::from(RoomSummary {
                name: "demo".into(),
                user_count: 2,
            })],
        };
        assert_eq!(
            serde_json::to_value(rooms).unwrap(),
            json!({ "rooms": [{ "name": "demo", "userCount": 2 }] })
        );
    }

    #[test]
    fn test_error_body() {
        let body = ErrorBody::new(ErrorCode::ValidationError, "room is required");
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({ "error": "validation_error", "message": "room is required" })
        );
    }
}
