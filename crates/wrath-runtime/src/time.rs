//! Monotonic time sources

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// A monotonic clock the frame loop samples.
///
/// `now` is measured from an arbitrary origin fixed at construction; only
/// differences between samples are meaningful.
pub trait TimeSource {
    fn now(&self) -> Duration;

    /// Block the frame thread for `duration`
    fn sleep(&self, duration: Duration);
}

/// Wall-clock time source backed by `instant::Instant`
pub struct SystemTimeSource {
    origin: instant::Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: instant::Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Manually driven time source for tests and headless runs.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// hand another to the scheduler. `sleep` advances time instead of blocking.
#[derive(Clone, Default)]
pub struct ManualTimeSource {
    now: Rc<Cell<Duration>>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
