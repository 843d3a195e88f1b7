//! Monotonic time source, injectable so tests never depend on wall-clock sleeps.
//!
//! The core state machine reads "now" exactly once per `maintain()` tick and
//! compares it against stored timestamps (`last_m_state_change`,
//! `time_rebooted`, `last_comm`). Routing every read through `Clock` keeps
//! that comparison deterministic in tests and immune to system clock skew.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

/// A monotonic reading, opaque outside this module except for ordering and
/// duration arithmetic. Backed by milliseconds since an arbitrary origin, not
/// by `std::time::Instant`, so that a "far past" sentinel can be constructed
/// without touching the platform clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Strictly less than any reading a real `Clock` impl will ever produce.
    /// Used to seed `time_rebooted` and `last_comm` on a fresh `Instance` so
    /// the first eligible `maintain()` trigger always fires immediately.
    pub const FAR_PAST: Timestamp = Timestamp(i64::MIN / 2);

    /// `self - earlier`, saturating at zero. Never overflows or panics,
    /// including when `earlier` is [`Timestamp::FAR_PAST`].
    pub fn elapsed_since(self, earlier: Timestamp) -> Duration {
        let millis = self.0.saturating_sub(earlier.0).max(0);
        Duration::from_millis(millis as u64)
    }
}

/// The only way core code may read "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Real monotonic clock, backed by `std::time::Instant`.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.origin.elapsed().as_millis() as i64)
    }
}

/// Virtual clock for deterministic tests: `now()` never advances on its own,
/// only when a test calls [`TestClock::set_offset`] or [`TestClock::advance`].
pub struct TestClock {
    offset_ms: AtomicI64,
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            offset_ms: AtomicI64::new(0),
        }
    }

    /// Set the clock to an absolute offset from creation time (not additive).
    pub fn set_offset(&self, offset: Duration) {
        self.offset_ms
            .store(offset.as_millis() as i64, Ordering::SeqCst);
    }

    /// Advance the clock by `delta` relative to its current reading.
    pub fn advance(&self, delta: Duration) {
        self.offset_ms
            .fetch_add(delta.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.offset_ms.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn far_past_is_strictly_less_than_any_real_reading() {
        let clock = TestClock::new();
        assert!(Timestamp::FAR_PAST < clock.now());
    }

    #[test]
    fn far_past_elapsed_never_overflows() {
        let clock = TestClock::new();
        clock.set_offset(Duration::from_secs(3600));
        let elapsed = clock.now().elapsed_since(Timestamp::FAR_PAST);
        assert!(elapsed > Duration::from_secs(1000));
    }

    #[test]
    fn set_offset_is_absolute_not_additive() {
        let clock = TestClock::new();
        clock.set_offset(Duration::from_secs(600));
        clock.set_offset(Duration::from_secs(100));
        assert_eq!(
            clock.now().elapsed_since(Timestamp(0)),
            Duration::from_secs(100)
        );
    }

    #[test]
    fn advance_is_relative() {
        let clock = TestClock::new();
        clock.set_offset(Duration::from_secs(100));
        clock.advance(Duration::from_secs(50));
        assert_eq!(
            clock.now().elapsed_since(Timestamp(0)),
            Duration::from_secs(150)
        );
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
