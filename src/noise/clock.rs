//! Monotonic time sources.
//!
//! The simulator integrates blob motion over elapsed time and the
//! conditioner mixes in the low bits of the current reading, so both take
//! their clock as a capability instead of calling `Instant::now` directly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A monotonic clock.
pub trait Clock: Send + Sync {
    /// Time elapsed since an arbitrary fixed origin. Never decreases.
    fn now(&self) -> Duration;
}

/// Wall-clock backed monotonic time.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Starts a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Scripted clock for reproducible runs.
///
/// Each reading returns the current time and then advances it by a fixed
/// tick. A zero tick gives a frozen clock.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
    tick: u64,
}

impl ManualClock {
    /// Creates a clock starting at zero that advances `tick` per reading.
    pub fn ticking(tick: Duration) -> Self {
        Self {
            nanos: AtomicU64::new(0),
            tick: duration_nanos(tick),
        }
    }

    /// Moves the clock forward without taking a reading.
    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(duration_nanos(by), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.fetch_add(self.tick, Ordering::SeqCst))
    }
}

fn duration_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_never_decreases() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_ticks_per_reading() {
        let clock = ManualClock::ticking(Duration::from_millis(16));

        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.now(), Duration::from_millis(16));

        clock.advance(Duration::from_millis(100));
        assert_eq!(clock.now(), Duration::from_millis(132));
    }

    #[test]
    fn test_frozen_clock() {
        let clock = ManualClock::default();
        assert_eq!(clock.now(), clock.now());
    }
}
