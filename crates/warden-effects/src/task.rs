//! Tokio-backed one-shot timers.
//!
//! Tracks spawned timer tasks and supports cooperative shutdown.
//!
//! # Blocking Lock Usage
//!
//! Uses `parking_lot::Mutex` for JoinHandle storage because:
//! 1. Operations are O(1) push or O(n) retain/drain
//! 2. Lock is never held across `.await` points
//! 3. No I/O or async work inside lock scope

use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use warden_core::{TimeError, TimerEffects, TimerHandle};

/// Timer handler spawning one task per scheduled callback on the current
/// tokio runtime.
///
/// Must be used from within a runtime context.
#[derive(Debug)]
pub struct TokioTimerHandler {
    shutdown_tx: watch::Sender<bool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TokioTimerHandler {
    /// Create a new timer handler
    pub fn new() -> Self {
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);
        Self {
            shutdown_tx,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Number of timers that have not yet completed.
    pub fn pending(&self) -> usize {
        let mut handles = self.handles.lock();
        handles.retain(|h| !h.is_finished());
        handles.len()
    }

    /// Abort every timer that has not fired yet and refuse new ones.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        for handle in self.handles.lock().drain(..) {
            handle.abort();
        }
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }
}

impl Default for TokioTimerHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TokioTimerHandler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl TimerEffects for TokioTimerHandler {
    fn schedule_once(
        &self,
        delay: Duration,
        task: BoxFuture<'static, ()>,
    ) -> Result<TimerHandle, TimeError> {
        if self.is_shut_down() {
            return Err(TimeError::ShutDown);
        }

        let handle = TimerHandle::new();
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let join = tokio::spawn(async move {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    tracing::debug!(timer = %handle, "Timer dropped on shutdown");
                }
                _ = tokio::time::sleep(delay) => task.await,
            }
        });

        let mut handles = self.handles.lock();
        handles.retain(|h| !h.is_finished());
        handles.push(join);
        Ok(handle)
    }
}
