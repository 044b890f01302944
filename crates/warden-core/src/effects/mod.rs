//! Core Effect Trait Definitions
//!
//! Pure trait definitions for every side effect the moderation core performs.
//! This module defines **what** effects can be performed; handlers in
//! `warden-effects` (production) and `warden-testkit` (testing) define **how**.
//!
//! # Effect Classification
//!
//! ## Infrastructure Effects (`warden-effects`)
//! OS and store integration with no moderation semantics:
//! - **Storage** (key-value store with atomic batches)
//! - **Time** (wall clock, one-shot timers)
//! - **Policy** (namespaced configuration)
//!
//! ## Game Server Effects (provided by the host server)
//! - **Roster**, **VoteState**, **VoteControl**
//!
//! ## Composite Effects
//! Convenience supertraits combining other effects (no handlers needed)

pub mod policy;
pub mod server;
pub mod storage;
pub mod supertraits;
pub mod task;
pub mod time;

pub use policy::{ConfigError, PolicyEffects};
pub use server::{
    Roster, RosterEffects, ServerError, Team, VoteControlEffects, VoteStateEffects, VoteTally,
};
pub use storage::{KeyValueEffects, StorageError, WriteBatch, WriteOp};
pub use supertraits::GameServerEffects;
pub use task::{TimerEffects, TimerHandle};
pub use time::{ClockEffects, TimeError};
