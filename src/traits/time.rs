use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

/// Abstraction over monotonic time sources.
/// Implementations: SystemClock (production), MockClock (testing).
pub trait Clock: Send + Sync {
    /// Current time in microseconds from an arbitrary epoch.
    /// Must be monotonically non-decreasing.
    fn now_us(&self) -> i64;
}

/// System clock backed by `std::time::Instant`.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_us(&self) -> i64 {
        self.start.elapsed().as_micros() as i64
    }
}

/// Mock clock for deterministic testing.
///
/// Atomic so lane worker threads can share one instance. With a non-zero
/// auto-advance step, every `now_us` call moves time forward, letting
/// busy-wait loops complete without real elapsed time.
pub struct MockClock {
    current_us: AtomicI64,
    auto_advance_us: i64,
}

impl MockClock {
    pub fn new() -> Self {
        Self {
            current_us: AtomicI64::new(0),
            auto_advance_us: 0,
        }
    }

    /// A clock that advances by `step_us` on every read.
    pub fn auto_advancing(step_us: i64) -> Self {
        Self {
            current_us: AtomicI64::new(0),
            auto_advance_us: step_us,
        }
    }

    pub fn set(&self, us: i64) {
        self.current_us.store(us, Ordering::Relaxed);
    }

    pub fn advance(&self, delta_us: i64) {
        self.current_us.fetch_add(delta_us, Ordering::Relaxed);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now_us(&self) -> i64 {
        self.current_us
            .fetch_add(self.auto_advance_us, Ordering::Relaxed)
    }
}
