//! Clock implementations.
//!
//! [`SystemClock`] reads the real wall clock; [`ManualClock`] is advanced by
//! hand so TTL behavior can be exercised without sleeping.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;

use crate::traits::Clock;

/// Wall-clock time from the system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        // Before-epoch clocks are treated as the epoch itself.
        let micros = Utc::now().timestamp_micros().max(0) as u64;
        Duration::from_micros(micros)
    }
}

/// Manually driven clock.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// give another to the cache.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    /// Creates a clock reading `start`.
    pub fn new(start: Duration) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Creates a clock reading `secs` seconds after the epoch.
    pub fn at_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Sets the current time.
    pub fn set(&self, now: Duration) {
        *self.now.lock() = now;
    }

    /// Sets the current time in whole seconds.
    pub fn set_secs(&self, secs: u64) {
        self.set(Duration::from_secs(secs));
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = now.saturating_add(by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}
