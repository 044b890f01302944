//! Hook dispatch.
//!
//! The host server calls [`EventRouter::dispatch`] for every hook it fires.
//! Hooks are processed one at a time, in call order: a dispatch lock is held
//! for the whole of each hook, and the arbiter's own state lock is only ever
//! taken while holding it (or by a confirmation, which takes the arbiter
//! lock alone), so lock order is always dispatch then arbiter.
//!
//! The audit log uses `parking_lot::Mutex`: operations are O(1) or O(n) over
//! at most eleven entries, and the lock is never held across `.await`.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warden_core::{
    ClockEffects, Elapsed, GameServerEffects, KeyValueEffects, PlayerId, PolicyEffects,
    ServerError, StorageError, TimerEffects, WardenResult,
};

use crate::arbiter::{ForceOutcome, VoteArbiter, VoteDecision};
use crate::audit::{AuditEntry, AuditLog};
use crate::history::{HistoryStore, LastSeen, PresenceUpdate};
use crate::policy::TeamsizeLimits;

/// Hooks the host server delivers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "hook", rename_all = "snake_case")]
pub enum HookEvent {
    /// A player finished connecting
    PlayerConnect {
        /// Identity of the player
        player: PlayerId,
        /// Display name at connect time
        name: String,
    },
    /// A player left
    PlayerDisconnect {
        /// Identity of the player
        player: PlayerId,
        /// Display name at disconnect time
        name: String,
    },
    /// Someone called a vote
    VoteCalled {
        /// Vote type, e.g. `teamsize` or `map`
        kind: String,
        /// Raw vote argument
        argument: String,
    },
    /// A chat command is being dispatched
    Command {
        /// Display name of the issuer
        actor: String,
        /// Command name
        command: String,
        /// Raw message text
        args: String,
    },
}

/// Effect handlers the moderation core runs against.
#[derive(Clone)]
pub struct ModerationEffects {
    /// Player history storage
    pub store: Arc<dyn KeyValueEffects>,
    /// Wall clock for last-seen timestamps
    pub clock: Arc<dyn ClockEffects>,
    /// Timer for vote confirmations
    pub timer: Arc<dyn TimerEffects>,
    /// Host game server
    pub server: Arc<dyn GameServerEffects>,
    /// Policy options
    pub policy: Arc<dyn PolicyEffects>,
}

/// Entry point for host server hooks.
pub struct EventRouter {
    dispatch: tokio::sync::Mutex<()>,
    history: HistoryStore,
    audit: Mutex<AuditLog>,
    arbiter: VoteArbiter,
}

impl EventRouter {
    /// Wire the moderation core to its effect handlers.
    pub fn new(effects: ModerationEffects) -> Self {
        Self {
            dispatch: tokio::sync::Mutex::new(()),
            history: HistoryStore::new(effects.store, effects.clock),
            audit: Mutex::new(AuditLog::new()),
            arbiter: VoteArbiter::new(effects.server, effects.policy, effects.timer),
        }
    }

    /// Process one hook.
    ///
    /// Only vote calls can be vetoed; every other hook returns
    /// [`VoteDecision::Continue`] on success. Store failures while recording
    /// presence are returned to the caller and nothing is retried.
    pub async fn dispatch(&self, event: HookEvent) -> WardenResult<VoteDecision> {
        let _serial = self.dispatch.lock().await;
        match event {
            HookEvent::PlayerConnect { player, name }
            | HookEvent::PlayerDisconnect { player, name } => {
                self.history.record_presence(player, &name).await?;
                Ok(VoteDecision::Continue)
            }
            HookEvent::VoteCalled { kind, argument } => {
                Ok(self.arbiter.on_vote_called(&kind, &argument).await?)
            }
            HookEvent::Command {
                actor,
                command,
                args,
            } => {
                self.audit
                    .lock()
                    .record(AuditEntry::new(actor, command, args));
                Ok(VoteDecision::Continue)
            }
        }
    }

    /// Record that `player` was seen, outside of a connect/disconnect hook.
    pub async fn record_presence(
        &self,
        player: PlayerId,
        display_name: &str,
    ) -> Result<PresenceUpdate, StorageError> {
        let _serial = self.dispatch.lock().await;
        self.history.record_presence(player, display_name).await
    }

    /// Record a dispatched command outside of a command hook.
    pub fn audit_record(&self, actor: &str, command: &str, raw_args: &str) {
        self.audit
            .lock()
            .record(AuditEntry::new(actor, command, raw_args));
    }

    /// Recently dispatched commands, newest first, excluding the newest.
    pub fn audit_recent(&self) -> Vec<AuditEntry> {
        self.audit.lock().recent()
    }

    /// Last time `player` connected or disconnected.
    pub async fn last_seen(&self, player: PlayerId) -> Result<LastSeen, StorageError> {
        self.history.last_seen(player).await
    }

    /// Days, hours and minutes since `player` was last seen.
    pub async fn elapsed_since(&self, player: PlayerId) -> Result<Option<Elapsed>, StorageError> {
        self.history.elapsed_since(player).await
    }

    /// Stored aliases of `player`, newest first.
    pub async fn aliases(&self, player: PlayerId) -> Result<Vec<String>, StorageError> {
        self.history.aliases(player).await
    }

    /// Every identity ever recorded.
    pub async fn known_players(&self) -> Result<Vec<PlayerId>, StorageError> {
        self.history.known_players().await
    }

    /// Pass or veto the vote in progress.
    pub async fn force_current(&self, pass: bool) -> Result<ForceOutcome, ServerError> {
        let _serial = self.dispatch.lock().await;
        self.arbiter.force_current(pass).await
    }

    /// Configured team size bounds.
    pub fn teamsize_limits(&self) -> TeamsizeLimits {
        self.arbiter.teamsize_limits()
    }

    /// The vote arbiter.
    pub fn arbiter(&self) -> &VoteArbiter {
        &self.arbiter
    }

    /// The player history ledger.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }
}
