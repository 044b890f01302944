use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use warden_core::ClockEffects;

/// Controllable clock for deterministic testing
#[derive(Debug, Clone)]
pub struct ControllableClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl ControllableClock {
    /// Create a clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Create a clock frozen at 2015-08-21 12:00:00 UTC
    pub fn fixed() -> Self {
        Self::new(Utc.with_ymd_and_hms(2015, 8, 21, 12, 0, 0).unwrap())
    }

    /// Advance time
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock();
        *current += by;
    }

    /// Set absolute time
    pub fn set(&self, at: DateTime<Utc>) {
        *self.current.lock() = at;
    }

    /// Get current time
    pub fn current(&self) -> DateTime<Utc> {
        *self.current.lock()
    }
}

impl Default for ControllableClock {
    fn default() -> Self {
        Self::fixed()
    }
}

#[async_trait]
impl ClockEffects for ControllableClock {
    async fn now(&self) -> DateTime<Utc> {
        self.current()
    }
}
