//! Runtime-agnostic one-shot timers.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::time::TimeError;

/// Handle identifying a scheduled task, used for logging and test inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(Uuid);

impl TimerHandle {
    /// Allocate a fresh handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimerHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timer contract for runtime implementations.
///
/// A scheduled task runs at most once, no earlier than `delay` after the call.
/// There is no cancellation; tasks that must not act after the fact carry
/// their own staleness checks.
pub trait TimerEffects: Send + Sync {
    /// Run `task` once after `delay`.
    fn schedule_once(
        &self,
        delay: Duration,
        task: BoxFuture<'static, ()>,
    ) -> Result<TimerHandle, TimeError>;
}

impl<T: TimerEffects + ?Sized> TimerEffects for Arc<T> {
    fn schedule_once(
        &self,
        delay: Duration,
        task: BoxFuture<'static, ()>,
    ) -> Result<TimerHandle, TimeError> {
        (**self).schedule_once(delay, task)
    }
}
