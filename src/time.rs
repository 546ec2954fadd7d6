//! Cycle clock
//!
//! A monotonic counter of reasoning cycles. All temporal arithmetic in the
//! control layer (forgetting deltas, novelty gating, event occurrence) is
//! expressed in cycles of this clock.

use std::sync::atomic::{AtomicI64, Ordering};

/// Monotonic cycle counter
#[derive(Debug)]
pub struct Clock {
    now: AtomicI64,
}

impl Clock {
    pub fn new() -> Self {
        Clock {
            now: AtomicI64::new(0),
        }
    }

    /// The current cycle
    pub fn now(&self) -> i64 {
        self.now.load(Ordering::Relaxed)
    }

    /// Advance by one cycle and return the new time
    pub fn next(&self) -> i64 {
        self.now.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Jump forward to `time`; the clock never moves backwards
    pub fn advance_to(&self, time: i64) {
        self.now.fetch_max(time, Ordering::Relaxed);
    }

    /// Reset to cycle 0
    pub fn reset(&self) {
        self.now.store(0, Ordering::Relaxed);
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances() {
        let clock = Clock::new();
        assert_eq!(clock.now(), 0);
        assert_eq!(clock.next(), 1);
        assert_eq!(clock.now(), 1);
    }

    #[test]
    fn test_advance_to_is_monotonic() {
        let clock = Clock::new();
        clock.advance_to(10);
        assert_eq!(clock.now(), 10);
        clock.advance_to(4);
        assert_eq!(clock.now(), 10);
    }

    #[test]
    fn test_reset() {
        let clock = Clock::new();
        clock.next();
        clock.reset();
        assert_eq!(clock.now(), 0);
    }
}
