//! Manually driven timer.
//!
//! Scheduled tasks are parked until the test advances virtual time or fires
//! them explicitly. Tasks run inline on the caller's task, one after another,
//! so a test observes every side effect as soon as the call returns.

use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::time::Duration;
use warden_core::{TimeError, TimerEffects, TimerHandle};

struct Parked {
    handle: TimerHandle,
    due: Duration,
    task: BoxFuture<'static, ()>,
}

/// Timer whose clock only moves when told to
#[derive(Default)]
pub struct ManualTimer {
    now: Mutex<Duration>,
    parked: Mutex<Vec<Parked>>,
    scheduled: Mutex<Vec<(TimerHandle, Duration)>>,
}

impl ManualTimer {
    /// Create a timer at virtual time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks waiting to fire
    pub fn pending(&self) -> usize {
        self.parked.lock().len()
    }

    /// Every delay ever requested, in scheduling order
    pub fn requested_delays(&self) -> Vec<Duration> {
        self.scheduled.lock().iter().map(|(_, d)| *d).collect()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        *self.now.lock()
    }

    /// Move virtual time forward and run every task that became due, earliest
    /// first. Returns the number of tasks run.
    pub async fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut fired = 0;
        while let Some(parked) = self.take_next(Some(target)) {
            *self.now.lock() = parked.due;
            parked.task.await;
            fired += 1;
        }
        *self.now.lock() = target;
        fired
    }

    /// Run the earliest parked task regardless of its due time.
    ///
    /// Returns its handle, or `None` if nothing was parked.
    pub async fn fire_next(&self) -> Option<TimerHandle> {
        let parked = self.take_next(None)?;
        {
            let mut now = self.now.lock();
            *now = (*now).max(parked.due);
        }
        parked.task.await;
        Some(parked.handle)
    }

    /// Run every parked task, including ones scheduled while firing.
    pub async fn fire_all(&self) -> usize {
        let mut fired = 0;
        while self.fire_next().await.is_some() {
            fired += 1;
        }
        fired
    }

    fn take_next(&self, deadline: Option<Duration>) -> Option<Parked> {
        let mut parked = self.parked.lock();
        let index = parked
            .iter()
            .enumerate()
            .filter(|(_, p)| deadline.map_or(true, |d| p.due <= d))
            .min_by_key(|(i, p)| (p.due, *i))
            .map(|(i, _)| i)?;
        Some(parked.remove(index))
    }
}

impl TimerEffects for ManualTimer {
    fn schedule_once(
        &self,
        delay: Duration,
        task: BoxFuture<'static, ()>,
    ) -> Result<TimerHandle, TimeError> {
        let handle = TimerHandle::new();
        let due = self.now() + delay;
        self.scheduled.lock().push((handle, delay));
        self.parked.lock().push(Parked { handle, due, task });
        Ok(handle)
    }
}
