//! Wall-clock time effects.
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `warden-effects` (system clock), `warden-testkit` (controllable clock)
//! - **Usage**: last-seen timestamps and elapsed-time reporting

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Error type for time operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum TimeError {
    /// The clock or timer backend cannot be reached.
    #[error("Time service unavailable")]
    ServiceUnavailable,
    /// The timer no longer accepts work.
    #[error("Timer runtime shut down")]
    ShutDown,
}

/// Wall-clock reads.
#[async_trait]
pub trait ClockEffects: Send + Sync {
    /// Current wall-clock time.
    async fn now(&self) -> DateTime<Utc>;
}

/// Blanket implementation for Arc<T> where T: ClockEffects
#[async_trait]
impl<T: ClockEffects + ?Sized> ClockEffects for Arc<T> {
    async fn now(&self) -> DateTime<Utc> {
        (**self).now().await
    }
}
