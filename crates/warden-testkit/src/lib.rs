//! Warden Testing Infrastructure
//!
//! Deterministic stand-ins for every effect the moderation core uses, plus a
//! harness that wires them into an `EventRouter`.
//!
//! # Usage
//!
//! Add this to your crate's `Cargo.toml` dev-dependencies:
//! ```toml
//! [dev-dependencies]
//! warden-testkit = { path = "../warden-testkit" }
//! ```
//!
//! Then in your tests:
//! ```rust,no_run
//! use warden_testkit::*;
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let harness = ModerationHarness::new(StaticPolicy::new().auto_pass(true));
//!     harness.call_vote("map", "campgrounds").await;
//!     // ... test logic
//! }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod clock;
pub mod fixtures;
pub mod policy;
pub mod server;
pub mod storage;
pub mod timer;

pub use clock::ControllableClock;
pub use fixtures::{init_test_tracing, player, ModerationHarness};
pub use policy::StaticPolicy;
pub use server::MockGameServer;
pub use storage::FaultyStore;
pub use timer::ManualTimer;
