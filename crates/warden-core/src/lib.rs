//! Warden Core - types and effect interfaces
//!
//! This crate defines the vocabulary shared by every layer of the warden
//! moderation stack. It contains no handlers and no policy, only the value
//! types and the effect traits the game server environment must provide.
//!
//! # Architecture Layers
//!
//! ## Value Types
//! - `PlayerId`: stable 64-bit player identity
//! - `Roster`, `Team`, `VoteTally`: live game-server state snapshots
//! - `Elapsed`: day/hour/minute breakdown for last-seen reporting
//!
//! ## Effect Interfaces (Pure Signatures)
//! - `KeyValueEffects`: get/set/list/set-membership plus atomic `WriteBatch` commits
//! - `ClockEffects`, `TimerEffects`: wall clock and one-shot delayed tasks
//! - `RosterEffects`, `VoteStateEffects`, `VoteControlEffects`: game server surface
//! - `PolicyEffects`: namespaced configuration lookups

#![forbid(unsafe_code)]

/// Pure effect interfaces (no implementations)
pub mod effects;

/// Unified error handling
pub mod errors;

/// Player identity parsing
pub mod identity;

/// Timestamp encoding and elapsed-time breakdown
pub mod time;

pub use effects::{
    ClockEffects, ConfigError, GameServerEffects, KeyValueEffects, PolicyEffects, Roster,
    RosterEffects, ServerError, StorageError, Team, TimeError, TimerEffects, TimerHandle,
    VoteControlEffects, VoteStateEffects, VoteTally, WriteBatch, WriteOp,
};
pub use errors::{WardenError, WardenResult};
pub use identity::{IdentityError, PlayerId};
pub use time::{Elapsed, TIMESTAMP_FORMAT};
