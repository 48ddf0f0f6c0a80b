//! HTTP route handlers
//!
//! Handlers validate input, call the [`TokenStore`], and shape JSON. Errors
//! map to `400 validation_error`, `404 not_found` or `500 server_error`;
//! server errors never expose their cause to the client.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tracing::{debug, error};

use passby_core::token::decoded_len;
use passby_core::{ErrorCode, RelayError, TokenEntry};

use crate::messages::{
    ClearRoomResponse, ErrorBody, HealthResponse, ListTokensQuery, RefreshResponse,
    RegisterRequest, RegisterResponse, RoomListResponse, StatsResponse, TokenListResponse,
    UnregisterQuery, UnregisterResponse,
};
use crate::store::TokenStore;
use crate::{SERVICE_NAME, SERVICE_VERSION};

const REGISTER_REQUIRED: &str = "userId, room, token are required";
const INVALID_TOKEN: &str = "token must be valid Base64";
const ROOM_REQUIRED: &str = "room is required";
const UNREGISTER_REQUIRED: &str = "userId and room are required";
const ROOM_NAME_REQUIRED: &str = "room name is required";

/// Shared state handed to every handler
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Arc<TokenStore>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<TokenStore>) -> Self {
        Self {
            store,
            started_at: Instant::now(),
        }
    }
}

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError(pub RelayError);

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            RelayError::Validation(msg) => debug!("Rejected request: {}", msg),
            RelayError::Internal(detail) => error!("Request failed: {}", detail),
        }

        let code = self.0.code();
        error_response(code, self.0.public_message())
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Build a JSON error response for `code`
pub fn error_response(code: ErrorCode, message: impl Into<String>) -> Response {
    let status = StatusCode::from_u16(code.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorBody::new(code, message))).into_response()
}

/// Build the API routes (without middleware layers)
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health).fallback(not_found))
        .route("/stats", get(stats).fallback(not_found))
        .route(
            "/ni/token",
            get(list_tokens)
                .post(register)
                .delete(unregister)
                .fallback(not_found),
        )
        .route("/ni/token/refresh", post(refresh).fallback(not_found))
        .route("/ni/rooms", get(list_rooms).fallback(not_found))
        .route("/ni/rooms/", delete(missing_room_name).fallback(not_found))
        .route("/ni/rooms/:name", delete(clear_room).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
}

/// A validated registration
#[derive(Debug)]
struct Registration {
    user_id: String,
    display_name: Option<String>,
    token: String,
    room: String,
    /// Decoded token size
    token_bytes: usize,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Parse a registration body. The Content-Type header is not consulted;
/// an empty body counts as a request with every field missing.
fn parse_registration(
    payload: Result<Bytes, BytesRejection>,
) -> Result<Registration, RelayError> {
    let body = payload.map_err(|e| RelayError::internal(format!("failed to read body: {}", e)))?;

    let req: RegisterRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RegisterRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| RelayError::internal(format!("bad request body: {}", e)))?
    };

    let (Some(user_id), Some(room), Some(token)) = (
        non_empty(req.user_id),
        non_empty(req.room),
        non_empty(req.token),
    ) else {
        return Err(RelayError::validation(REGISTER_REQUIRED));
    };

    let token_bytes =
        decoded_len(&token).ok_or_else(|| RelayError::validation(INVALID_TOKEN))?;

    Ok(Registration {
        user_id,
        display_name: req.display_name,
        token,
        room,
        token_bytes,
    })
}

fn store_registration(state: &AppState, reg: Registration) -> TokenEntry {
    debug!(
        "Storing token for {} in {} ({} bytes)",
        reg.user_id, reg.room, reg.token_bytes
    );
    state
        .store
        .register(&reg.user_id, reg.display_name, &reg.token, &reg.room)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        name: SERVICE_NAME.to_string(),
        version: SERVICE_VERSION.to_string(),
        status: "ok".to_string(),
    })
}

async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.store.stats();
    Json(StatsResponse {
        total_tokens: stats.total_tokens,
        room_count: stats.room_count,
        uptime: state.started_at.elapsed().as_secs(),
    })
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Bytes, BytesRejection>,
) -> ApiResult<RegisterResponse> {
    let reg = parse_registration(payload)?;
    let entry = store_registration(&state, reg);
    Ok(Json(RegisterResponse::from(&entry)))
}

async fn refresh(
    State(state): State<AppState>,
    payload: Result<Bytes, BytesRejection>,
) -> ApiResult<RefreshResponse> {
    let reg = parse_registration(payload)?;
    let entry = store_registration(&state, reg);
    Ok(Json(RefreshResponse::from(&entry)))
}

async fn list_tokens(
    State(state): State<AppState>,
    query: Result<Query<ListTokensQuery>, QueryRejection>,
) -> ApiResult<TokenListResponse> {
    let Query(query) = query.map_err(|_| RelayError::validation(ROOM_REQUIRED))?;
    let room = non_empty(query.room).ok_or_else(|| RelayError::validation(ROOM_REQUIRED))?;
    let exclude = non_empty(query.exclude_user_id);

    let tokens = state
        .store
        .tokens_in_room(&room, exclude.as_deref())
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(TokenListResponse { tokens }))
}

async fn unregister(
    State(state): State<AppState>,
    query: Result<Query<UnregisterQuery>, QueryRejection>,
) -> ApiResult<UnregisterResponse> {
    let Query(query) = query.map_err(|_| RelayError::validation(UNREGISTER_REQUIRED))?;
    let (Some(user_id), Some(room)) = (non_empty(query.user_id), non_empty(query.room)) else {
        return Err(RelayError::validation(UNREGISTER_REQUIRED).into());
    };

    let deleted = state.store.unregister(&user_id, &room);
    Ok(Json(UnregisterResponse {
        success: true,
        deleted,
    }))
}

async fn list_rooms(State(state): State<AppState>) -> Json<RoomListResponse> {
    let rooms = state.store.rooms().into_iter().map(Into::into).collect();
    Json(RoomListResponse { rooms })
}

async fn clear_room(
    State(state): State<AppState>,
    name: Result<Path<String>, PathRejection>,
) -> ApiResult<ClearRoomResponse> {
    let name = name
        .ok()
        .and_then(|Path(name)| non_empty(Some(name)))
        .ok_or_else(|| RelayError::validation(ROOM_NAME_REQUIRED))?;

    let deleted_tokens = state.store.clear_room(&name);
    Ok(Json(ClearRoomResponse {
        success: true,
        deleted_tokens,
    }))
}

async fn missing_room_name() -> ApiError {
    RelayError::validation(ROOM_NAME_REQUIRED).into()
}

async fn not_found(method: Method, uri: Uri) -> Response {
    error_response(
        ErrorCode::NotFound,
        format!("Route {} {} not found", method, uri.path()),
    )
}
