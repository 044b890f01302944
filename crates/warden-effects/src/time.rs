//! System clock handler
//!
//! Stateless implementation of `ClockEffects` delegating to the operating
//! system wall clock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use warden_core::ClockEffects;

/// Real clock handler for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClockHandler;

impl SystemClockHandler {
    /// Create a new system clock handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ClockEffects for SystemClockHandler {
    async fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
