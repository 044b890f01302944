//! Warden Effects - production effect handlers
//!
//! Stateless or self-contained implementations of the effect traits defined in
//! `warden-core`. Handlers here delegate to the operating system, the tokio
//! runtime or an in-process model; they carry no moderation semantics.
//!
//! **Layer Constraint**: no scripted mocks. Deterministic test doubles
//! (manual timers, controllable clocks, fault injection) live in
//! `warden-testkit`.

#![forbid(unsafe_code)]

pub mod policy;
pub mod server;
pub mod storage;
pub mod task;
pub mod time;

pub use policy::TomlPolicyHandler;
pub use server::InMemoryGameServer;
pub use storage::{FileKvHandler, MemoryKvHandler};
pub use task::TokioTimerHandler;
pub use time::SystemClockHandler;
