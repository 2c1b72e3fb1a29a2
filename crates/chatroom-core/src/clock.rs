//! Time source abstraction.
//!
//! Presence decisions and message timestamps read the current time through
//! [`Clock`] so that tests can drive expiry by advancing a [`ManualClock`]
//! instead of sleeping.

use chrono::{DateTime, Local, TimeDelta, Utc};
use std::sync::{Arc, Mutex};

/// Display format for message timestamps (`HH:MM:SS`, no date).
pub const MESSAGE_TIME_FORMAT: &str = "%H:%M:%S";

/// A source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Formats an instant for display on a message, in local time.
    fn format_time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&Local)
            .format(MESSAGE_TIME_FORMAT)
            .to_string()
    }
}

/// Wall clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += delta;
    }

    /// Moves the clock forward by whole seconds.
    pub fn advance_secs(&self, secs: i64) {
        self.advance(TimeDelta::seconds(secs));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
