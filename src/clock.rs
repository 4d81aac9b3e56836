//! Time sources for the anomaly detectors.
//!
//! Detectors sample the clock at the point of use. Timestamps are seconds as
//! `f64`, on the wall clock for [`SystemClock`].

use std::cell::Cell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

/// A source of timestamps in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock (seconds since the Unix epoch).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Manually driven clock for tests and offline replay.
///
/// Clones share the same time, so one handle can be given to a detector and
/// another kept to advance it.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            time: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, time: f64) {
        self.time.set(time);
    }

    pub fn advance(&self, seconds: f64) {
        self.time.set(self.time.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.time.get()
    }
}

/// Seconds from `start` to `now`, clamped to zero when the clock went backwards.
pub fn elapsed_since(start: f64, now: f64) -> f64 {
    let elapsed = now - start;
    if elapsed < 0.0 {
        warn!(start, now, "clock moved backwards, treating elapsed time as zero");
        0.0
    } else {
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new(100.0);
        let handle = clock.clone();

        handle.advance(5.0);
        assert_eq!(clock.now(), 105.0);

        handle.set(1.0);
        assert_eq!(clock.now(), 1.0);
    }

    #[test]
    fn test_system_clock_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now() > 1_577_836_800.0);
    }

    #[test]
    fn test_elapsed_since_clamps_negative() {
        assert_eq!(elapsed_since(10.0, 15.5), 5.5);
        assert_eq!(elapsed_since(10.0, 4.0), 0.0);
    }
}
