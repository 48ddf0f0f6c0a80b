//! Passby Core - Shared types, configuration, and error definitions
//!
//! This crate contains the foundational types used by the token relay.
//! It has no dependencies on networking code.

pub mod clock;
pub mod config;
pub mod error;
pub mod token;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{RelayConfig, ServerConfig, TokenConfig};
pub use error::*;
pub use types::*;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Default token time-to-live in seconds (30 minutes)
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 30 * 60;
