//! Warden Moderation - vote arbitration and player history
//!
//! The stateful core behind a game server's administrative plugin:
//!
//! - [`VoteArbiter`]: tracks the vote in flight and, when policy allows,
//!   force-passes it after a fixed delay if it still holds a majority
//! - [`HistoryStore`]: per-player alias history and last-seen ledger kept in an
//!   external key-value store
//! - [`AuditLog`]: short ring buffer of recently dispatched commands
//! - [`EventRouter`]: the hook surface the host server calls into
//!
//! All side effects go through the effect traits in `warden-core`, so the same
//! code runs against a live server, the in-process model in `warden-effects`,
//! or the deterministic doubles in `warden-testkit`.

#![forbid(unsafe_code)]

pub mod alias;
pub mod arbiter;
pub mod audit;
pub mod history;
pub mod policy;
pub mod router;

pub use arbiter::{
    ForceOutcome, Resolution, ScheduledConfirmation, VetoReason, VoteArbiter, VoteDecision,
    CONFIRMATION_DELAY,
};
pub use audit::{AuditEntry, AuditLog, AUDIT_CAPACITY};
pub use history::{HistoryStore, LastSeen, PresenceUpdate, ALIAS_CAPACITY};
pub use policy::{TeamsizeLimits, VotePolicy, POLICY_NAMESPACE};
pub use router::{EventRouter, HookEvent, ModerationEffects};
