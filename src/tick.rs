// src/tick.rs
//! Recurring repaint task for the LCD screen.
//!
//! Cooperative, single-threaded: nothing here spawns. The render loop polls
//! the driver with the current instant and repaints once per elapsed
//! interval. Cancellation is a shared flag so a replaced driver can be
//! observed as dead even through an old handle; the store enforces
//! cancel-before-reschedule structurally by owning a single
//! `Option<TickDriver>` and always cancelling on replacement.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Observer handle for a driver's liveness. Cheap to clone; survives the
/// driver it came from.
#[derive(Debug, Clone)]
pub struct TickHandle {
    cancelled: Arc<AtomicBool>,
}

impl TickHandle {
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Cancel the associated driver. Idempotent.
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

/// A repeating fixed-interval task, polled rather than scheduled.
#[derive(Debug)]
pub struct TickDriver {
    interval: Duration,
    next_due: Instant,
    cancelled: Arc<AtomicBool>,
}

impl TickDriver {
    /// Starts a driver whose first fire is one full interval after `start`.
    /// (The caller paints synchronously at bind time, so the driver only
    /// covers subsequent frames.)
    pub fn start(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            next_due: start + interval,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn handle(&self) -> TickHandle {
        TickHandle {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Number of intervals elapsed up to `now`. A cancelled driver never
    /// fires. Catch-up is bounded by wall time only; the intervals here are
    /// seconds, not frame-rate sized, so unbounded catch-up is not a hazard.
    pub fn poll(&mut self, now: Instant) -> u32 {
        if self.is_cancelled() {
            return 0;
        }
        let mut fires = 0;
        while self.next_due <= now {
            self.next_due += self.interval;
            fires += 1;
        }
        fires
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        // A dropped driver is as dead as a cancelled one; old handles agree.
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_interval() {
        let start = Instant::now();
        let mut driver = TickDriver::start(Duration::from_millis(1000), start);

        assert_eq!(driver.poll(start), 0);
        assert_eq!(driver.poll(start + Duration::from_millis(999)), 0);
        assert_eq!(driver.poll(start + Duration::from_millis(1000)), 1);
        assert_eq!(driver.poll(start + Duration::from_millis(1500)), 0);
        assert_eq!(driver.poll(start + Duration::from_millis(2000)), 1);
    }

    #[test]
    fn catches_up_after_a_stall() {
        let start = Instant::now();
        let mut driver = TickDriver::start(Duration::from_millis(1000), start);
        assert_eq!(driver.poll(start + Duration::from_millis(3500)), 3);
        assert_eq!(driver.poll(start + Duration::from_millis(4000)), 1);
    }

    #[test]
    fn cancelled_driver_never_fires() {
        let start = Instant::now();
        let mut driver = TickDriver::start(Duration::from_millis(1000), start);
        let handle = driver.handle();
        handle.cancel();

        assert!(driver.is_cancelled());
        assert_eq!(driver.poll(start + Duration::from_secs(10)), 0);
    }

    #[test]
    fn drop_marks_handle_cancelled() {
        let driver = TickDriver::start(Duration::from_millis(1000), Instant::now());
        let handle = driver.handle();
        assert!(!handle.is_cancelled());
        drop(driver);
        assert!(handle.is_cancelled());
    }
}
