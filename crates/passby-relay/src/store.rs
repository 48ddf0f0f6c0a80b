//! In-memory token registry with lazy expiry
//!
//! Entries are keyed by `(room, user_id)` and kept in registration order.
//! Every read sweeps expired entries out of the whole store before it looks
//! at anything, so an expired entry is never returned even if no background
//! reaper is running.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{debug, info};

use passby_core::{Clock, RoomSummary, StoreStats, SystemClock, TokenEntry};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct EntryKey {
    room: String,
    user_id: String,
}

impl EntryKey {
    fn new(room: &str, user_id: &str) -> Self {
        Self {
            room: room.to_string(),
            user_id: user_id.to_string(),
        }
    }
}

/// TTL-bounded registry of per-room token entries
#[derive(Debug)]
pub struct TokenStore {
    /// Live (and not yet swept) entries in registration order
    entries: Mutex<IndexMap<EntryKey, TokenEntry>>,
    /// Lifetime of an entry after each registration
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenStore {
    /// Create a store backed by the system clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a store with an explicit clock
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
            ttl,
            clock,
        }
    }

    /// Entry time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert or overwrite the entry for `(room, user_id)`.
    ///
    /// Re-registering keeps the entry's position and resets its TTL.
    pub fn register(
        &self,
        user_id: &str,
        display_name: Option<String>,
        token: &str,
        room: &str,
    ) -> TokenEntry {
        let now = self.clock.now();
        let entry = TokenEntry::new(user_id, display_name, token, room, now, self.ttl);

        let replaced = self
            .entries
            .lock()
            .insert(EntryKey::new(room, user_id), entry.clone())
            .is_some();

        debug!(
            "Token {}: user={}, room={}, expires_at={}",
            if replaced { "refreshed" } else { "registered" },
            user_id,
            room,
            entry.expires_at
        );
        entry
    }

    /// Live entries in `room`, optionally leaving out one user's own entry
    pub fn tokens_in_room(&self, room: &str, exclude_user_id: Option<&str>) -> Vec<TokenEntry> {
        let mut entries = self.entries.lock();
        self.sweep_locked(&mut entries);

        entries
            .values()
            .filter(|e| e.room == room)
            .filter(|e| exclude_user_id != Some(e.user_id.as_str()))
            .cloned()
            .collect()
    }

    /// Remove the entry for `(room, user_id)`.
    ///
    /// Returns `true` only if a live entry was removed.
    pub fn unregister(&self, user_id: &str, room: &str) -> bool {
        let now = self.clock.now();
        let removed = self
            .entries
            .lock()
            .shift_remove(&EntryKey::new(room, user_id));

        match removed {
            Some(entry) if !entry.is_expired_at(now) => {
                debug!("Token unregistered: user={}, room={}", user_id, room);
                true
            }
            _ => false,
        }
    }

    /// Remove every entry in `room`, returning how many live entries went away
    pub fn clear_room(&self, room: &str) -> usize {
        let mut entries = self.entries.lock();
        self.sweep_locked(&mut entries);

        let before = entries.len();
        entries.retain(|key, _| key.room != room);
        let removed = before - entries.len();

        if removed > 0 {
            info!("Room {} cleared ({} tokens)", room, removed);
        }
        removed
    }

    /// Rooms with at least one live entry, in order of first registration
    pub fn rooms(&self) -> Vec<RoomSummary> {
        let mut entries = self.entries.lock();
        self.sweep_locked(&mut entries);

        group_by_room(&entries)
            .into_iter()
            .map(|(name, user_count)| RoomSummary {
                name: name.to_string(),
                user_count,
            })
            .collect()
    }

    /// Live entry and room counts
    pub fn stats(&self) -> StoreStats {
        let mut entries = self.entries.lock();
        self.sweep_locked(&mut entries);

        StoreStats {
            total_tokens: entries.len(),
            room_count: group_by_room(&entries).len(),
        }
    }

    /// Drop every expired entry, returning how many were removed
    pub fn sweep_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        self.sweep_locked(&mut entries)
    }

    /// Raw entry count, including expired entries not yet swept
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn sweep_locked(&self, entries: &mut IndexMap<EntryKey, TokenEntry>) -> usize {
        let now: DateTime<Utc> = self.clock.now();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired_at(now));
        let removed = before - entries.len();

        if removed > 0 {
            info!("Expired {} tokens ({} remaining)", removed, entries.len());
        }
        removed
    }
}

/// Count entries per room, keeping first-seen order
fn group_by_room(entries: &IndexMap<EntryKey, TokenEntry>) -> IndexMap<&str, usize> {
    let mut rooms: IndexMap<&str, usize> = IndexMap::new();
    for key in entries.keys() {
        *rooms.entry(key.room.as_str()).or_insert(0) += 1;
    }
    rooms
}
