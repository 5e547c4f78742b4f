//! Time sources.

use crate::models::Timestamp;
use std::cell::Cell;

/// Milliseconds in one minute.
pub const MS_PER_MINUTE: f64 = 60_000.0;

/// Milliseconds in one day.
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Wall-clock source in milliseconds since the Unix epoch.
pub trait Clock {
    fn now_ms(&self) -> Timestamp;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Timestamp {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }

    pub fn advance_ms(&self, ms: Timestamp) {
        self.now.set(self.now.get() + ms);
    }

    pub fn advance_minutes(&self, minutes: f64) {
        self.advance_ms((minutes * MS_PER_MINUTE) as Timestamp);
    }

    pub fn advance_days(&self, days: f64) {
        self.advance_ms((days * MS_PER_DAY) as Timestamp);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Timestamp {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> Timestamp {
        (**self).now_ms()
    }
}
