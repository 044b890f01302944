//! Player history ledger.
//!
//! Remembers, per player identity, the last [`ALIAS_CAPACITY`] distinct names
//! the player used and when the player was last seen.
//!
//! # Storage Layout
//!
//! - `minqlx:players:<id>`: list of normalized aliases, newest first
//! - `minqlx:players:<id>:last_seen`: UTC timestamp (`%Y-%m-%d %H:%M:%S`)
//! - `minqlx:players`: set of every identity ever recorded
//!
//! The layout is shared with other tools reading the same store.
//!
//! # Invariants
//!
//! - Every write produced by one [`HistoryStore::record_presence`] call goes
//!   out as a single `WriteBatch`, so readers never see a new alias without
//!   the matching timestamp
//! - Aliases are compared in normalized form; a name that differs from a
//!   stored alias only in color codes is not stored again
//! - Records are never deleted here

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warden_core::time::{decode_timestamp, encode_timestamp};
use warden_core::{
    ClockEffects, Elapsed, KeyValueEffects, PlayerId, StorageError, WriteBatch,
};

use crate::alias::normalize;

/// Distinct aliases kept per player.
pub const ALIAS_CAPACITY: usize = 20;

/// Set of every identity ever recorded.
pub const PLAYER_INDEX_KEY: &str = "minqlx:players";

fn alias_key(player: PlayerId) -> String {
    format!("{PLAYER_INDEX_KEY}:{player}")
}

fn last_seen_key(player: PlayerId) -> String {
    format!("{PLAYER_INDEX_KEY}:{player}:last_seen")
}

/// When a player was last seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "at", rename_all = "snake_case")]
pub enum LastSeen {
    /// No record exists for the identity
    Never,
    /// Most recent connect or disconnect
    At(DateTime<Utc>),
}

impl LastSeen {
    /// Timestamp, if the player was ever seen.
    pub fn at(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Never => None,
            Self::At(at) => Some(at),
        }
    }
}

/// What a presence update changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceUpdate {
    /// First sighting; record created
    Created,
    /// New alias stored and timestamp refreshed
    AliasAdded,
    /// Known alias; only the timestamp was refreshed
    Refreshed,
}

/// Player history ledger over an external key-value store.
#[derive(Clone)]
pub struct HistoryStore {
    store: Arc<dyn KeyValueEffects>,
    clock: Arc<dyn ClockEffects>,
}

impl HistoryStore {
    /// Create a ledger over `store`, timestamping with `clock`.
    pub fn new(store: Arc<dyn KeyValueEffects>, clock: Arc<dyn ClockEffects>) -> Self {
        Self { store, clock }
    }

    /// Note that `player` was just seen under `display_name`.
    ///
    /// Called on connect and on disconnect alike.
    pub async fn record_presence(
        &self,
        player: PlayerId,
        display_name: &str,
    ) -> Result<PresenceUpdate, StorageError> {
        let key = alias_key(player);
        let alias = normalize(display_name);
        let now = encode_timestamp(self.clock.now().await);

        let (batch, update) = if !self.store.exists(&key).await? {
            let batch = WriteBatch::new()
                .list_push(&key, alias)
                .set_add(PLAYER_INDEX_KEY, player.to_string());
            (batch, PresenceUpdate::Created)
        } else {
            let known = self.store.list_range(&key, 0, -1).await?;
            if known.iter().any(|stored| normalize(stored) == alias) {
                (WriteBatch::new(), PresenceUpdate::Refreshed)
            } else {
                let batch = WriteBatch::new()
                    .list_push(&key, alias)
                    .list_trim(&key, 0, ALIAS_CAPACITY as i64 - 1);
                (batch, PresenceUpdate::AliasAdded)
            }
        };

        self.store
            .commit(batch.set(last_seen_key(player), now))
            .await?;

        match update {
            PresenceUpdate::Created => {
                tracing::info!(player = %player, name = display_name, "Recorded new player");
            }
            PresenceUpdate::AliasAdded => {
                tracing::debug!(player = %player, name = display_name, "Recorded new alias");
            }
            PresenceUpdate::Refreshed => {}
        }
        Ok(update)
    }

    /// Last connect or disconnect of `player`.
    pub async fn last_seen(&self, player: PlayerId) -> Result<LastSeen, StorageError> {
        let key = last_seen_key(player);
        match self.store.get(&key).await? {
            None => Ok(LastSeen::Never),
            Some(raw) => decode_timestamp(&raw)
                .map(LastSeen::At)
                .ok_or_else(|| StorageError::Corrupt {
                    key,
                    reason: format!("unparseable timestamp {raw:?}"),
                }),
        }
    }

    /// Time since `player` was last seen, `None` if never seen.
    pub async fn elapsed_since(&self, player: PlayerId) -> Result<Option<Elapsed>, StorageError> {
        let Some(then) = self.last_seen(player).await?.at() else {
            return Ok(None);
        };
        Ok(Some(Elapsed::between(then, self.clock.now().await)))
    }

    /// Stored aliases of `player`, newest first. Empty if unknown.
    pub async fn aliases(&self, player: PlayerId) -> Result<Vec<String>, StorageError> {
        self.store.list_range(&alias_key(player), 0, -1).await
    }

    /// Every identity ever recorded, ascending.
    pub async fn known_players(&self) -> Result<Vec<PlayerId>, StorageError> {
        let mut players: Vec<PlayerId> = self
            .store
            .set_members(PLAYER_INDEX_KEY)
            .await?
            .into_iter()
            .filter_map(|member| match member.parse::<u64>() {
                Ok(raw) => Some(PlayerId::new(raw)),
                Err(_) => {
                    tracing::warn!(%member, "Skipping malformed player index entry");
                    None
                }
            })
            .collect();
        players.sort_unstable();
        Ok(players)
    }
}
