//! Host time adapter.
//!
//! Monotonic uptime for loop pacing plus local wall-clock time for the
//! schedule executor.

use chrono::{Local, NaiveDateTime};

pub struct SystemClock {
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since start (monotonic).
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Current local date and time.
    pub fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
