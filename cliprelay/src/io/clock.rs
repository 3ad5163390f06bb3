//! Time source for waits and polling.

use std::time::Duration;

/// Blocking sleep, injectable so tests can observe waits without taking time.
pub trait Clock {
    fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleeping on the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
