//! Passby Token Relay
//!
//! Lightweight HTTP relay that lets two phones swap ranging handshake tokens
//! when they cannot find each other over local transport.
//!
//! # Protocol
//!
//! 1. A device registers its Base64 token into a room (`POST /ni/token`)
//! 2. Other devices in the room poll the token list, excluding themselves
//!    (`GET /ni/token?room=..&excludeUserId=..`, about every 3 seconds)
//! 3. A device hands a peer's token to its ranging layer out of band
//! 4. Devices refresh to extend the TTL (`POST /ni/token/refresh`)
//! 5. Devices unregister on leaving (`DELETE /ni/token?userId=..&room=..`)
//!
//! Entries expire 30 minutes after their last registration. Everything is
//! held in memory; nothing survives a restart.
//!
//! `userId` is taken on trust: any client can overwrite another user's token
//! in the same room by reusing its id.

pub mod api;
pub mod messages;
pub mod server;
pub mod store;

pub use api::{router, ApiError, AppState};
pub use messages::{ErrorBody, RegisterRequest, TokenView};
pub use server::RelayServer;
pub use store::TokenStore;

/// Service name reported by the health check
pub const SERVICE_NAME: &str = "passby-relay";

/// Service version reported by the health check
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
